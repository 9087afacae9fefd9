//! Static HTML pages.
//!
//! The pages carry no data; they poll the JSON routes from the browser.

pub const LOGIN_PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Hive Monitor</title>
<style>
body { font-family: system-ui, sans-serif; background: #fdf6e3; display: flex; justify-content: center; padding-top: 4rem; }
form { background: #fff; padding: 2rem; border-radius: 8px; box-shadow: 0 2px 8px #0002; }
input { display: block; width: 16rem; margin: .5rem 0 1rem; padding: .4rem; }
button { background: #e0a100; border: 0; padding: .6rem 1.2rem; border-radius: 4px; cursor: pointer; }
</style>
</head>
<body>
<form method="post" action="/login">
  <h2>Hive Monitor</h2>
  <label>Username<input name="username" autocomplete="username"></label>
  <label>Password<input name="password" type="password" autocomplete="current-password"></label>
  <button type="submit">Log in</button>
</form>
</body>
</html>
"#;

pub const LOGIN_FAILED_PAGE: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Login failed</title></head>
<body style="font-family: system-ui, sans-serif; padding: 2rem;">
<h2>Invalid username or password</h2>
<p><a href="/">Try again</a></p>
</body>
</html>
"#;

pub const DASHBOARD_PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Hive Monitor - Dashboard</title>
<style>
body { font-family: system-ui, sans-serif; background: #fdf6e3; margin: 0; padding: 1rem 2rem; }
.cards { display: flex; gap: 1rem; flex-wrap: wrap; }
.card { background: #fff; padding: 1rem 1.5rem; border-radius: 8px; min-width: 9rem; box-shadow: 0 2px 6px #0001; }
.card b { display: block; font-size: 1.8rem; }
table { border-collapse: collapse; margin-top: 1rem; background: #fff; }
td, th { padding: .3rem .8rem; border-bottom: 1px solid #eee; text-align: right; }
form input { width: 7rem; }
nav a { margin-right: 1rem; }
</style>
</head>
<body>
<nav><a href="/report">Monthly report</a><a href="/logout">Log out</a></nav>
<h2>Current conditions</h2>
<div class="cards">
  <div class="card">Temperature<b id="temp">-</b>&deg;C</div>
  <div class="card">Humidity<b id="hum">-</b>%</div>
  <div class="card">Weight<b id="weight">-</b>kg</div>
  <div class="card">Air quality<b id="air">-</b></div>
</div>

<h2>Alert settings</h2>
<form method="post" action="/save_settings">
  Phone <input name="phone" id="phone">
  Temp &gt; <input name="lt" id="lt">
  Humidity &gt; <input name="lh" id="lh">
  Weight &gt; <input name="lw" id="lw">
  Air &gt; <input name="la" id="la">
  <button type="submit">Save</button>
</form>
<p><button id="sms">Send test SMS</button> <span id="sms-status"></span></p>

<h2>Recent readings</h2>
<table id="history"><tr><th>Time</th><th>Temp</th><th>Hum</th><th>Weight</th><th>Air</th></tr></table>

<script>
async function refresh() {
  const r = await fetch('/data');
  if (r.redirected) { location = r.url; return; }
  const d = await r.json();
  temp.textContent = d.temp.toFixed(1);
  hum.textContent = d.hum.toFixed(1);
  weight.textContent = d.weight.toFixed(1);
  air.textContent = d.air;
}
async function loadSettings() {
  const s = await (await fetch('/get_settings')).json();
  phone.value = s.phone; lt.value = s.lt; lh.value = s.lh; lw.value = s.lw; la.value = s.la;
}
async function loadHistory() {
  const rows = await (await fetch('/history')).json();
  const t = document.getElementById('history');
  while (t.rows.length > 1) t.deleteRow(1);
  for (const h of rows) {
    const tr = t.insertRow();
    for (const v of [h.timestamp, h.temp.toFixed(1), h.hum.toFixed(1), h.weight.toFixed(1), h.mq]) {
      tr.insertCell().textContent = v;
    }
  }
}
document.getElementById('sms').onclick = async () => {
  const r = await fetch('/sms', { method: 'POST' });
  document.getElementById('sms-status').textContent = await r.text();
};
refresh(); loadSettings(); loadHistory();
setInterval(refresh, 2000);
setInterval(loadHistory, 60000);
</script>
</body>
</html>
"#;

pub const REPORT_PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Hive Monitor - Monthly report</title>
<style>
body { font-family: system-ui, sans-serif; background: #fdf6e3; padding: 1rem 2rem; }
table { border-collapse: collapse; background: #fff; }
td, th { padding: .3rem .8rem; border-bottom: 1px solid #eee; text-align: right; }
</style>
</head>
<body>
<p><a href="/dashboard">Back to dashboard</a></p>
<h2>Daily averages (last 30 days)</h2>
<table id="days"><tr><th>Day</th><th>Temp</th><th>Hum</th><th>Weight</th><th>Air</th></tr></table>
<script>
(async () => {
  const rows = await (await fetch('/monthly_data')).json();
  const t = document.getElementById('days');
  for (const d of rows) {
    const tr = t.insertRow();
    for (const v of [d.day, d.avg_temp.toFixed(1), d.avg_hum.toFixed(1), d.avg_weight.toFixed(1), d.avg_mq.toFixed(0)]) {
      tr.insertCell().textContent = v;
    }
  }
})();
</script>
</body>
</html>
"#;
