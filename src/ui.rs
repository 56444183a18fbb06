pub fn render_index(hide_sidebar: bool) -> String {
    let sidebar_class = if hide_sidebar { "sidebar hidden" } else { "sidebar" };
    INDEX_HTML.replace("{{SIDEBAR_CLASS}}", sidebar_class)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Desk Metrics</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --accent-3: #86bbd8;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      padding: 32px 18px 48px;
    }

    .layout {
      display: grid;
      grid-template-columns: 260px minmax(0, 1fr);
      gap: 24px;
      max-width: 1280px;
      margin: 0 auto;
    }

    .layout.embedded {
      grid-template-columns: minmax(0, 1fr);
    }

    .sidebar {
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 24px;
      display: grid;
      gap: 14px;
      align-content: start;
    }

    .sidebar.hidden {
      display: none;
    }

    .app {
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-wrap: wrap;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0;
      font-size: 1.2rem;
    }

    .subtitle {
      margin: 0;
      color: #5f5c57;
      font-size: 1rem;
    }

    .controls {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(170px, 1fr));
      gap: 14px;
      align-items: end;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    input,
    select {
      font: inherit;
      font-size: 0.95rem;
      text-transform: none;
      letter-spacing: normal;
      color: var(--ink);
      border: 1px solid rgba(47, 72, 88, 0.18);
      border-radius: 12px;
      padding: 8px 10px;
      background: white;
    }

    select[multiple] {
      min-height: 84px;
    }

    .panel {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .stat {
      background: white;
      border-radius: 18px;
      padding: 18px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 8px;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
      color: #8b857d;
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
      color: var(--accent-2);
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 12px 18px;
      font-size: 0.95rem;
      font-weight: 600;
      cursor: pointer;
      transition: transform 150ms ease, box-shadow 150ms ease;
    }

    button:active {
      transform: scale(0.98);
    }

    button:disabled {
      opacity: 0.4;
      cursor: default;
    }

    .btn-primary {
      background: var(--accent);
      color: white;
      box-shadow: 0 10px 24px rgba(255, 107, 74, 0.3);
    }

    .btn-secondary {
      background: var(--accent-2);
      color: white;
      box-shadow: 0 10px 24px rgba(47, 72, 88, 0.3);
    }

    .tabs {
      display: flex;
      gap: 6px;
      padding: 6px;
      background: rgba(47, 72, 88, 0.08);
      border-radius: 999px;
    }

    .tab {
      background: transparent;
      border-radius: 999px;
      padding: 8px 14px;
      font-size: 0.9rem;
      color: #6b645d;
      box-shadow: none;
    }

    .tab.active {
      background: white;
      color: var(--accent-2);
      box-shadow: 0 8px 16px rgba(47, 72, 88, 0.12);
    }

    .charts {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(420px, 1fr));
      gap: 20px;
    }

    .chart-card {
      background: white;
      border-radius: 20px;
      padding: 16px;
      border: 1px solid rgba(47, 72, 88, 0.08);
      display: grid;
      gap: 10px;
    }

    .chart-card svg {
      width: 100%;
      height: 240px;
      display: block;
    }

    .chart-card svg text {
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    .chart-line {
      fill: none;
      stroke-width: 3;
    }

    .chart-area-fill {
      opacity: 0.18;
    }

    .chart-grid {
      stroke: rgba(47, 72, 88, 0.12);
    }

    .chart-label {
      fill: #7a746d;
      font-size: 11px;
    }

    .legend {
      display: flex;
      gap: 14px;
      font-size: 0.85rem;
      color: #6b645d;
    }

    .legend i {
      display: inline-block;
      width: 10px;
      height: 10px;
      border-radius: 50%;
      margin-right: 6px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
      font-size: 0.92rem;
    }

    th,
    td {
      text-align: left;
      padding: 10px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.08);
    }

    th {
      font-size: 0.75rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: #8b857d;
    }

    .pager {
      display: flex;
      align-items: center;
      justify-content: flex-end;
      gap: 12px;
    }

    .status {
      font-size: 0.95rem;
      color: #6b645d;
      min-height: 1.2em;
    }

    .status[data-type="error"] {
      color: #c63b2b;
    }

    .status[data-type="warn"] {
      color: #b26a00;
    }

    .status[data-type="ok"] {
      color: #2d7a4b;
    }

    .hint {
      margin: 0;
      color: #6f6a65;
      font-size: 0.9rem;
    }

    @keyframes rise {
      from {
        opacity: 0;
        transform: translateY(18px);
      }
      to {
        opacity: 1;
        transform: translateY(0);
      }
    }

    @media (max-width: 900px) {
      .layout {
        grid-template-columns: minmax(0, 1fr);
      }
      .charts {
        grid-template-columns: minmax(0, 1fr);
      }
      .app {
        padding: 28px 22px;
      }
    }
  </style>
</head>
<body>
  <div class="layout" id="layout">
    <aside id="sidebar" class="{{SIDEBAR_CLASS}}">
      <h2>Connection</h2>
      <div class="stat">
        <span class="label">Destination</span>
        <span class="value" id="conn-destination">--</span>
      </div>
      <div class="stat">
        <span class="label">Database</span>
        <span id="conn-database">--</span>
      </div>
      <div class="stat">
        <span class="label">Schema</span>
        <span id="conn-schema">--</span>
      </div>
      <p class="hint" id="conn-message"></p>
    </aside>

    <main class="app">
      <header>
        <div>
          <h1 id="page-title">Ticket Metrics</h1>
          <p class="subtitle" id="page-range">Loading...</p>
        </div>
        <div class="tabs" role="tablist">
          <button class="tab active" type="button" data-page="tickets" role="tab" aria-selected="true">Tickets</button>
          <button class="tab" type="button" data-page="sla" role="tab" aria-selected="false">SLA policies</button>
          <button class="tab" type="button" data-page="assignees" role="tab" aria-selected="false">Assignees</button>
        </div>
      </header>

      <section class="controls">
        <label>Start date <input type="date" id="start-date" /></label>
        <label>End date <input type="date" id="end-date" /></label>
        <label>Week starts
          <select id="week-start">
            <option value="sunday">Sunday</option>
            <option value="monday">Monday</option>
          </select>
        </label>
        <label id="attribute-wrap">Drill down by <select id="attribute"></select></label>
        <label id="years-wrap">Years <select id="years" multiple></select></label>
        <button class="btn-primary" id="apply" type="button">Apply</button>
        <button class="btn-secondary" id="clear-filters" type="button">Clear filters</button>
      </section>

      <section class="controls" id="filters"></section>

      <div class="status" id="status"></div>

      <section class="panel" id="kpis"></section>

      <section class="charts" id="charts"></section>

      <section class="chart-card" id="table-card" hidden>
        <h2>Assignee summary</h2>
        <table>
          <thead>
            <tr>
              <th>Assignee</th>
              <th>Solved</th>
              <th>First reply (h)</th>
              <th>Requester wait (h)</th>
              <th>Last assignment to resolution (h)</th>
              <th>Final resolution (h)</th>
            </tr>
          </thead>
          <tbody id="table-body"></tbody>
        </table>
        <div class="pager">
          <button class="btn-secondary" id="prev-page" type="button">Prev</button>
          <span id="page-info"></span>
          <button class="btn-secondary" id="next-page" type="button">Next</button>
        </div>
      </section>

      <p class="hint">Leave both dates empty to use the page default. Choosing a null entry in a filter leaves that column unfiltered.</p>
    </main>
  </div>

  <script>
    const PAGES = {
      tickets: {
        title: 'Ticket Metrics',
        endpoint: '/api/tickets/metrics',
        attributes: ['ticket_brand', 'ticket_channel', 'ticket_form', 'ticket_group', 'ticket_priority', 'ticket_type']
      },
      sla: {
        title: 'SLA Policies',
        endpoint: '/api/sla/policies',
        attributes: ['sla_policy_name', 'ticket_brand', 'ticket_channel', 'ticket_form', 'ticket_group']
      },
      assignees: {
        title: 'Assignee Activity',
        endpoint: '/api/assignees/activity',
        attributes: []
      }
    };
    const NULL_OPTION = '__null__';
    const COLORS = ['#ff6b4a', '#2f4858', '#86bbd8', '#f6ae2d', '#33658a', '#9bc53d', '#c3423f', '#5f5c57'];

    const layoutEl = document.getElementById('layout');
    const sidebarEl = document.getElementById('sidebar');
    const titleEl = document.getElementById('page-title');
    const rangeEl = document.getElementById('page-range');
    const startEl = document.getElementById('start-date');
    const endEl = document.getElementById('end-date');
    const weekStartEl = document.getElementById('week-start');
    const attributeEl = document.getElementById('attribute');
    const attributeWrap = document.getElementById('attribute-wrap');
    const yearsEl = document.getElementById('years');
    const yearsWrap = document.getElementById('years-wrap');
    const filtersEl = document.getElementById('filters');
    const statusEl = document.getElementById('status');
    const kpisEl = document.getElementById('kpis');
    const chartsEl = document.getElementById('charts');
    const tableCard = document.getElementById('table-card');
    const tableBody = document.getElementById('table-body');
    const pageInfo = document.getElementById('page-info');
    const prevBtn = document.getElementById('prev-page');
    const nextBtn = document.getElementById('next-page');
    const tabs = Array.from(document.querySelectorAll('.tab'));

    if (sidebarEl.classList.contains('hidden')) {
      layoutEl.classList.add('embedded');
    }

    const sessionId = (() => {
      const existing = localStorage.getItem('desk-session');
      if (existing) {
        return existing;
      }
      const fresh = `s-${Date.now().toString(36)}-${Math.random().toString(36).slice(2, 10)}`;
      localStorage.setItem('desk-session', fresh);
      return fresh;
    })();

    let activePage = 'tickets';
    let selectedFilters = {};

    const setStatus = (message, type) => {
      statusEl.textContent = message || '';
      statusEl.dataset.type = type || '';
    };

    const escapeHtml = (value) =>
      String(value).replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' })[c]);

    const pretty = (column) => column.replace(/_/g, ' ').replace(/^\w/, (c) => c.toUpperCase());

    const formatMetric = (value, suffix = '') => {
      if (typeof value !== 'number' || Number.isNaN(value)) {
        return 'No data';
      }
      const rounded = Math.round(value * 100) / 100;
      return `${rounded}${suffix}`;
    };

    const formatAxisValue = (value) => {
      const rounded = Math.round(value * 10) / 10;
      return Number.isInteger(rounded) ? rounded.toString() : rounded.toFixed(1);
    };

    const chartCard = (title, legend) => {
      const card = document.createElement('div');
      card.className = 'chart-card';
      const legendHtml = legend
        ? `<div class="legend">${legend
            .map((item, i) => `<span><i style="background:${COLORS[i % COLORS.length]}"></i>${escapeHtml(item)}</span>`)
            .join('')}</div>`
        : '';
      card.innerHTML = `<h2>${escapeHtml(title)}</h2>${legendHtml}<svg viewBox="0 0 600 240" role="img"></svg>`;
      chartsEl.appendChild(card);
      return card.querySelector('svg');
    };

    const emptyChart = (svg) => {
      svg.innerHTML = '<text class="chart-label" x="50%" y="50%" text-anchor="middle">No data for this selection</text>';
    };

    const frame = (labels, max) => {
      const width = 600;
      const height = 240;
      const paddingX = 44;
      const paddingY = 34;
      const top = 18;
      const scaleY = (height - top - paddingY) / (max || 1);
      const y = (value) => height - paddingY - value * scaleY;
      let grid = '';
      for (let i = 0; i <= 4; i += 1) {
        const value = ((max || 1) * i) / 4;
        grid += `<line class="chart-grid" x1="${paddingX}" y1="${y(value)}" x2="${width - paddingX}" y2="${y(value)}" />`;
        grid += `<text class="chart-label" x="${paddingX - 8}" y="${y(value) + 4}" text-anchor="end">${formatAxisValue(value)}</text>`;
      }
      const slot = (width - paddingX * 2) / Math.max(labels.length, 1);
      const labelEvery = Math.ceil(labels.length / 10);
      const xLabels = labels
        .map((label, i) =>
          i % labelEvery === 0
            ? `<text class="chart-label" x="${paddingX + slot * (i + 0.5)}" y="${height - paddingY + 18}" text-anchor="middle">${escapeHtml(label)}</text>`
            : ''
        )
        .join('');
      return { y, slot, paddingX, grid, xLabels, base: height - paddingY };
    };

    const renderBars = (svg, labels, series) => {
      if (!labels.length) {
        emptyChart(svg);
        return;
      }
      const max = Math.max(...series.flatMap((s) => s));
      const f = frame(labels, max);
      const barWidth = (f.slot * 0.7) / series.length;
      let bars = '';
      series.forEach((values, s) => {
        values.forEach((value, i) => {
          const x = f.paddingX + f.slot * i + f.slot * 0.15 + barWidth * s;
          bars += `<rect x="${x}" y="${f.y(value)}" width="${barWidth}" height="${f.base - f.y(value)}" rx="4" fill="${COLORS[s % COLORS.length]}"><title>${escapeHtml(labels[i])}: ${value}</title></rect>`;
        });
      });
      svg.innerHTML = `${f.grid}${bars}${f.xLabels}`;
    };

    const renderLines = (svg, labels, series, area) => {
      if (!labels.length) {
        emptyChart(svg);
        return;
      }
      const max = Math.max(...series.flatMap((s) => s.filter((v) => typeof v === 'number')));
      const f = frame(labels, max);
      const x = (i) => f.paddingX + f.slot * (i + 0.5);
      let paths = '';
      series.forEach((values, s) => {
        const color = COLORS[s % COLORS.length];
        const points = values
          .map((value, i) => (typeof value === 'number' ? [x(i), f.y(value)] : null))
          .filter(Boolean);
        if (!points.length) {
          return;
        }
        const d = points.map(([px, py], i) => `${i === 0 ? 'M' : 'L'} ${px.toFixed(2)} ${py.toFixed(2)}`).join(' ');
        if (area) {
          const last = points[points.length - 1];
          paths += `<path class="chart-area-fill" fill="${color}" d="${d} L ${last[0]} ${f.base} L ${points[0][0]} ${f.base} Z" />`;
        }
        paths += `<path class="chart-line" stroke="${color}" d="${d}" />`;
      });
      svg.innerHTML = `${f.grid}${paths}${f.xLabels}`;
    };

    const renderPie = (svg, shares) => {
      if (!shares.length) {
        emptyChart(svg);
        return;
      }
      const cx = 150;
      const cy = 120;
      const r = 100;
      let angle = -Math.PI / 2;
      let slices = '';
      let legend = '';
      shares.forEach((share, i) => {
        const sweep = (share.percent / 100) * Math.PI * 2;
        const color = COLORS[i % COLORS.length];
        if (share.percent >= 99.99) {
          slices += `<circle cx="${cx}" cy="${cy}" r="${r}" fill="${color}" />`;
        } else {
          const x1 = cx + r * Math.cos(angle);
          const y1 = cy + r * Math.sin(angle);
          const x2 = cx + r * Math.cos(angle + sweep);
          const y2 = cy + r * Math.sin(angle + sweep);
          const large = sweep > Math.PI ? 1 : 0;
          slices += `<path d="M ${cx} ${cy} L ${x1} ${y1} A ${r} ${r} 0 ${large} 1 ${x2} ${y2} Z" fill="${color}" />`;
        }
        angle += sweep;
        legend += `<text class="chart-label" x="300" y="${40 + i * 22}"><tspan fill="${color}">&#9679;</tspan> ${escapeHtml(share.key)}: ${share.percent}%</text>`;
      });
      svg.innerHTML = `${slices}${legend}`;
    };

    const renderShares = (title, shares) => {
      renderBars(chartCard(title), shares.map((s) => String(s.key)), [shares.map((s) => s.percent)]);
    };

    const renderKpis = (items) => {
      kpisEl.innerHTML = items
        .map(
          (item) => `<div class="stat"><span class="label">${escapeHtml(item.label)}</span><span class="value">${escapeHtml(item.value)}</span></div>`
        )
        .join('');
    };

    const renderFilters = (options) => {
      filtersEl.innerHTML = '';
      Object.entries(options).forEach(([column, values]) => {
        const wrap = document.createElement('label');
        wrap.textContent = pretty(column);
        const select = document.createElement('select');
        select.multiple = true;
        select.dataset.column = column;
        const chosen = selectedFilters[column] || [];
        const nullOption = new Option('(any)', NULL_OPTION, false, chosen.includes(null));
        select.appendChild(nullOption);
        values.forEach((value) => {
          select.appendChild(new Option(value, value, false, chosen.includes(value)));
        });
        wrap.appendChild(select);
        filtersEl.appendChild(wrap);
      });
    };

    const readFilters = () => {
      const filters = {};
      filtersEl.querySelectorAll('select').forEach((select) => {
        const values = Array.from(select.selectedOptions).map((o) => (o.value === NULL_OPTION ? null : o.value));
        if (values.length) {
          filters[select.dataset.column] = values;
        }
      });
      return filters;
    };

    const setAttributes = () => {
      const attributes = PAGES[activePage].attributes;
      attributeWrap.hidden = !attributes.length;
      attributeEl.innerHTML = attributes.map((a) => `<option value="${a}">${pretty(a)}</option>`).join('');
      yearsWrap.hidden = activePage !== 'tickets';
    };

    const renderTickets = (body) => {
      renderKpis([
        { label: 'Created', value: body.kpis.created },
        { label: 'Unsolved', value: body.kpis.unsolved },
        { label: 'Solved', value: body.kpis.solved }
      ]);
      renderShares('Tickets created by hour (%)', body.by_hour);
      renderBars(
        chartCard('Average tickets created by weekday'),
        body.by_weekday.map((d) => d.day.slice(0, 3)),
        [body.by_weekday.map((d) => d.average)]
      );
      renderLines(
        chartCard('Created vs solved', ['Created', 'Solved']),
        body.created_vs_solved.map((d) => d.date.slice(5)),
        [body.created_vs_solved.map((d) => d.created), body.created_vs_solved.map((d) => d.solved)],
        false
      );
      renderShares(`Top ${pretty(body.attribute).toLowerCase()} (%)`, body.top_attributes);
      const tab = body.attribute_by_date;
      renderLines(
        chartCard(`${pretty(body.attribute)} by date`, tab.columns),
        tab.rows.map((d) => d.slice(5)),
        tab.columns.map((_, c) => tab.counts.map((row) => row[c])),
        true
      );
      const grid = body.monthly.grid;
      renderBars(
        chartCard('Tickets created by month', grid.columns.map(String)),
        grid.rows.map(String),
        grid.columns.map((_, c) => grid.counts.map((row) => row[c]))
      );
      const chosenYears = body.monthly.selected_years;
      yearsEl.innerHTML = body.monthly.years_available
        .map((y) => `<option value="${y}" ${chosenYears.includes(y) ? 'selected' : ''}>${y}</option>`)
        .join('');
    };

    const renderSla = (body) => {
      const k = body.kpis;
      renderKpis([
        { label: 'Achievement rate', value: formatMetric(k.achievement_rate, '%') },
        { label: 'Breached tickets', value: k.breached_tickets },
        { label: 'Achieved tickets', value: k.achieved_tickets },
        { label: 'Active tickets', value: k.active_tickets },
        { label: 'At-risk tickets', value: k.at_risk_tickets }
      ]);
      renderBars(
        chartCard('Completed SLAs by day', ['Achieved', 'Breached']),
        body.completed_by_date.map((d) => d.date.slice(5)),
        [body.completed_by_date.map((d) => d.achieved), body.completed_by_date.map((d) => d.breached)]
      );
      renderShares(`Top achieved by ${pretty(body.attribute).toLowerCase()} (%)`, body.top_achieved);
      renderShares(`Top breached by ${pretty(body.attribute).toLowerCase()} (%)`, body.top_breached);
      renderShares('Breaches by hour (%)', body.breaches_by_hour);
      renderBars(
        chartCard('Average breaches by weekday'),
        body.breaches_by_weekday.map((d) => d.day.slice(0, 3)),
        [body.breaches_by_weekday.map((d) => d.average)]
      );
    };

    const renderAssignees = (body) => {
      const k = body.kpis;
      renderKpis([
        { label: 'Solved', value: k.solved },
        { label: 'One-touch', value: formatMetric(k.one_touch_percent, '%') },
        { label: 'Two-touch', value: formatMetric(k.two_touch_percent, '%') },
        { label: 'Median wait (min)', value: formatMetric(k.median_wait_minutes) },
        { label: 'Mean wait (min)', value: formatMetric(k.mean_wait_minutes) },
        { label: 'Median assignment to resolution (min)', value: formatMetric(k.median_first_assignment_to_resolution_minutes) }
      ]);
      renderPie(chartCard('Satisfaction'), body.satisfaction);
      renderPie(chartCard('Requester wait'), body.wait_brackets);
      renderBars(
        chartCard('Tickets per day'),
        body.daily.map((d) => d.date.slice(5)),
        [body.daily.map((d) => d.tickets)]
      );
      renderLines(
        chartCard('Median requester wait per day (min)'),
        body.daily.map((d) => d.date.slice(5)),
        [body.daily.map((d) => d.median_wait_minutes)],
        true
      );
      const table = body.table;
      tableBody.innerHTML = table.items
        .map(
          (row) => `<tr><td>${escapeHtml(row.assignee_name)}</td><td>${row.solved}</td><td>${formatMetric(row.first_reply_hours)}</td><td>${formatMetric(row.requester_wait_hours)}</td><td>${formatMetric(row.last_assignment_to_resolution_hours)}</td><td>${formatMetric(row.final_resolution_hours)}</td></tr>`
        )
        .join('');
      pageInfo.textContent = table.page_count ? `Page ${table.page + 1} of ${table.page_count}` : 'No assignees';
      prevBtn.disabled = table.page === 0;
      nextBtn.disabled = table.page + 1 >= table.page_count;
      tableCard.hidden = false;
    };

    const buildRequest = (pageAction) => {
      const request = {
        filters: readFilters(),
        week_start: weekStartEl.value
      };
      if (startEl.value) {
        request.start_date = startEl.value;
      }
      if (endEl.value) {
        request.end_date = endEl.value;
      }
      if (PAGES[activePage].attributes.length && attributeEl.value) {
        request.attribute = attributeEl.value;
      }
      if (activePage === 'tickets') {
        const years = Array.from(yearsEl.selectedOptions).map((o) => Number(o.value));
        if (years.length) {
          request.years = years;
        }
      }
      if (pageAction) {
        request.page_action = pageAction;
      }
      return request;
    };

    const load = async (pageAction) => {
      selectedFilters = readFilters();
      setStatus('Loading...', 'info');
      const res = await fetch(PAGES[activePage].endpoint, {
        method: 'POST',
        headers: { 'content-type': 'application/json', 'x-session-id': sessionId },
        body: JSON.stringify(buildRequest(pageAction))
      });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || 'Request failed');
      }
      const payload = await res.json();

      kpisEl.innerHTML = '';
      chartsEl.innerHTML = '';
      tableCard.hidden = true;
      renderFilters(payload.filter_options);

      if (payload.status === 'misconfigured') {
        rangeEl.textContent = 'Not connected';
        setStatus(payload.message, 'warn');
        return;
      }
      if (payload.status === 'incomplete_range') {
        rangeEl.textContent = 'Waiting for a complete date range';
        setStatus(payload.message, 'warn');
        return;
      }

      rangeEl.textContent = `${payload.date_range.start} to ${payload.date_range.end}`;
      if (activePage === 'tickets') {
        renderTickets(payload.body);
      } else if (activePage === 'sla') {
        renderSla(payload.body);
      } else {
        renderAssignees(payload.body);
      }
      setStatus('', '');
    };

    const loadConnection = async () => {
      const res = await fetch('/api/connection');
      if (!res.ok) {
        throw new Error('Unable to load connection');
      }
      const info = await res.json();
      document.getElementById('conn-destination').textContent = info.destination;
      document.getElementById('conn-database').textContent = info.database || '--';
      document.getElementById('conn-schema').textContent = info.schema || '--';
      document.getElementById('conn-message').textContent = info.ready
        ? `Reading from ${info.source}.`
        : info.message || '';
    };

    const setActivePage = (page) => {
      activePage = page;
      selectedFilters = {};
      filtersEl.innerHTML = '';
      startEl.value = '';
      endEl.value = '';
      titleEl.textContent = PAGES[page].title;
      tabs.forEach((button) => {
        const isActive = button.dataset.page === page;
        button.classList.toggle('active', isActive);
        button.setAttribute('aria-selected', String(isActive));
      });
      setAttributes();
      load().catch((err) => setStatus(err.message, 'error'));
    };

    tabs.forEach((button) => {
      button.addEventListener('click', () => setActivePage(button.dataset.page));
    });
    document.getElementById('apply').addEventListener('click', () => {
      load().catch((err) => setStatus(err.message, 'error'));
    });
    document.getElementById('clear-filters').addEventListener('click', () => {
      filtersEl.querySelectorAll('option').forEach((o) => {
        o.selected = false;
      });
      load().catch((err) => setStatus(err.message, 'error'));
    });
    prevBtn.addEventListener('click', () => load('prev').catch((err) => setStatus(err.message, 'error')));
    nextBtn.addEventListener('click', () => load('next').catch((err) => setStatus(err.message, 'error')));

    if (!sidebarEl.classList.contains('hidden')) {
      loadConnection().catch((err) => setStatus(err.message, 'error'));
    }
    setActivePage('tickets');
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidebar_can_be_hidden() {
        assert!(render_index(false).contains(r#"<aside id="sidebar" class="sidebar">"#));
        assert!(render_index(true).contains(r#"<aside id="sidebar" class="sidebar hidden">"#));
    }
}
