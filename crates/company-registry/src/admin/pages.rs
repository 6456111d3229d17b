//! Server-rendered admin pages. Both are static; the dashboard pulls data
//! from the admin JSON API.

pub const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Registry Admin Login</title>
<style>
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, sans-serif; background: #eef1f5; }
main { max-width: 380px; margin: 96px auto; background: #fff; padding: 32px; border-radius: 8px; box-shadow: 0 2px 12px rgba(0, 0, 0, 0.08); }
h1 { font-size: 22px; text-align: center; margin-bottom: 24px; color: #1f2933; }
label { display: block; margin: 14px 0 6px; color: #52606d; }
input { width: 100%; padding: 10px; border: 1px solid #cbd2d9; border-radius: 4px; }
button { width: 100%; margin-top: 22px; padding: 12px; border: 0; border-radius: 4px; background: #1f3a5f; color: #fff; font-size: 15px; cursor: pointer; }
#error { color: #b42318; margin-top: 12px; text-align: center; min-height: 1em; }
</style>
</head>
<body>
<main>
<h1>Registry Admin</h1>
<form id="login">
<label for="username">Username</label>
<input id="username" autocomplete="username" required>
<label for="password">Password</label>
<input id="password" type="password" autocomplete="current-password" required>
<button type="submit">Sign in</button>
<p id="error"></p>
</form>
</main>
<script>
document.getElementById('login').addEventListener('submit', async (event) => {
  event.preventDefault();
  const error = document.getElementById('error');
  error.textContent = '';
  try {
    const response = await fetch('/admin/login', {
      method: 'POST',
      headers: { 'Content-Type': 'application/json' },
      body: JSON.stringify({
        username: document.getElementById('username').value,
        password: document.getElementById('password').value,
      }),
    });
    const result = await response.json();
    if (result.success) {
      window.location.assign('/admin/dashboard');
    } else {
      error.textContent = result.error || 'Invalid credentials';
    }
  } catch (_) {
    error.textContent = 'Login failed';
  }
});
</script>
</body>
</html>
"#;

pub const DASHBOARD_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Registry Admin Dashboard</title>
<style>
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, sans-serif; background: #eef1f5; color: #1f2933; }
header { display: flex; justify-content: space-between; align-items: center; padding: 18px 28px; background: #1f3a5f; color: #fff; }
header a { color: #fff; text-decoration: none; padding: 6px 14px; border: 1px solid rgba(255, 255, 255, 0.4); border-radius: 4px; }
main { max-width: 1100px; margin: 28px auto; padding: 0 20px; }
section { background: #fff; padding: 24px; border-radius: 8px; margin-bottom: 24px; box-shadow: 0 2px 12px rgba(0, 0, 0, 0.06); }
h2 { font-size: 18px; margin-bottom: 16px; }
.card { padding: 14px; margin-bottom: 10px; border-left: 4px solid #1f3a5f; background: #f7f9fb; border-radius: 4px; }
.card h3 { font-size: 16px; margin-bottom: 6px; }
.card p { color: #52606d; margin: 3px 0; }
.actions button { margin: 8px 8px 0 0; padding: 7px 14px; border: 0; border-radius: 4px; color: #fff; cursor: pointer; }
.approve { background: #1e7d32; }
.reject { background: #b42318; }
</style>
</head>
<body>
<header><h1>Registry Admin</h1><a href="/admin/logout">Sign out</a></header>
<main>
<section><h2>Pending registrations</h2><div id="pending"><p>Loading...</p></div></section>
<section><h2>Approved registrations</h2><div id="approved"><p>Loading...</p></div></section>
<section><h2>Rejected registrations</h2><div id="rejected"><p>Loading...</p></div></section>
</main>
<script>
const escapeHtml = (value) => String(value ?? '').replace(/[&<>"']/g, (c) => ({
  '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;',
}[c]));
const formatDate = (value) => value ? new Date(value).toLocaleDateString() : '';

function card(company) {
  const lines = [
    `<p><strong>Reg #:</strong> ${escapeHtml(company.registrationNumber)}</p>`,
    `<p><strong>Type:</strong> ${escapeHtml(company.businessType)}</p>`,
    `<p><strong>Contact:</strong> ${escapeHtml(company.contactPerson)} (${escapeHtml(company.email)}, ${escapeHtml(company.phone)})</p>`,
    `<p><strong>Address:</strong> ${escapeHtml(company.address)}</p>`,
    `<p><strong>Submitted:</strong> ${formatDate(company.submittedDate)}</p>`,
  ];
  if (company.status === 'approved') {
    lines.push(`<p><strong>Approved:</strong> ${formatDate(company.approvedDate)}</p>`);
  }
  if (company.status === 'pending') {
    const id = encodeURIComponent(company.id);
    lines.push(`<div class="actions"><button class="approve" data-id="${id}" data-decision="approve">Approve</button><button class="reject" data-id="${id}" data-decision="reject">Reject</button></div>`);
  }
  return `<div class="card"><h3>${escapeHtml(company.companyName)}</h3>${lines.join('')}</div>`;
}

function render(target, companies, empty) {
  document.getElementById(target).innerHTML = companies.length
    ? companies.map(card).join('')
    : `<p>${empty}</p>`;
}

async function load() {
  const response = await fetch('/api/admin/companies');
  const { companies } = await response.json();
  render('pending', companies.filter((c) => c.status === 'pending'), 'No pending registrations');
  render('approved', companies.filter((c) => c.status === 'approved'), 'No approved registrations');
  render('rejected', companies.filter((c) => c.status === 'rejected'), 'No rejected registrations');
}

document.addEventListener('click', async (event) => {
  const button = event.target.closest('button[data-decision]');
  if (!button) return;
  const { id, decision } = button.dataset;
  if (decision === 'reject' && !window.confirm('Reject this registration?')) return;
  await fetch(`/api/admin/companies/${id}/${decision}`, { method: 'PUT' });
  load();
});

load().catch((error) => console.error(error));
</script>
</body>
</html>
"#;
