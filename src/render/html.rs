use crate::experiment::ReportData;

/// Render a self-contained HTML comparison report (data embedded as JSON).
///
/// Important: we avoid `format!()` because the HTML contains many `{}` from JS
/// template literals (e.g., `${x}`), which would conflict with Rust formatting.
pub fn render_html_report(data: &ReportData) -> anyhow::Result<String> {
    // Embedded as JS object literal; "</" must not close the script element.
    let json = serde_json::to_string(data)?.replace("</", "<\\/");

    const TEMPLATE: &str = r##"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Benchmark comparison</title>
<style>
  body { font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif; margin: 0; }
  header { padding: 12px 16px; border-bottom: 1px solid #ddd; }
  .container { display: flex; height: calc(100vh - 58px); }
  .sidebar { width: 280px; border-right: 1px solid #ddd; padding: 12px; overflow: auto; }
  .main { flex: 1; padding: 12px; overflow: auto; }

  .summary { display: flex; gap: 16px; flex-wrap: wrap; font-size: 14px; color: #333; }
  .pill { padding: 4px 8px; border: 1px solid #ddd; border-radius: 999px; background: #fafafa; }

  .chart-item { cursor: pointer; user-select: none; padding: 4px 6px; border-radius: 4px; }
  .chart-item:hover { background: #f3f3f3; }
  .chart-item.selected { background: #e9f2ff; border: 1px solid #cfe3ff; }
  .muted { color: #777; font-size: 12px; }
  .legend { display: flex; gap: 12px; font-size: 13px; margin: 6px 0; }
  .swatch { display: inline-block; width: 10px; height: 10px; margin-right: 4px; }

  table { border-collapse: collapse; width: 100%; margin-top: 8px; }
  th, td { border-bottom: 1px solid #eee; padding: 6px 8px; text-align: left; font-size: 14px; }
  th { background: white; border-bottom: 1px solid #ddd; }
  .num { text-align: right; font-variant-numeric: tabular-nums; }
</style>
</head>
<body>
<header>
  <div class="summary" id="summary"></div>
</header>

<div class="container">
  <div class="sidebar">
    <div id="charts"></div>
  </div>

  <div class="main">
    <h2 id="title">Select a chart</h2>
    <div id="meta" class="muted"></div>
    <div id="legend" class="legend"></div>
    <svg id="plot" width="900" height="360"></svg>

    <table id="barsTable" style="display:none;">
      <thead>
        <tr>
          <th>metric</th>
          <th>source</th>
          <th class="num">n</th>
          <th class="num">mean</th>
          <th class="num">sd</th>
        </tr>
      </thead>
      <tbody id="barsBody"></tbody>
    </table>
  </div>
</div>

<script>
// Embedded report data (JSON object literal)
const DATA = __DATA__;

const COLORS = ["#4c72b0", "#dd8452", "#55a868", "#c44e52", "#8172b3", "#937860", "#da8bc3"];

const state = {
  selected: null
};

function fmt(x) {
  if (x === null || x === undefined) return "–";
  return (Math.round(x * 1000) / 1000).toFixed(3);
}

function escapeHtml(s) {
  return String(s)
    .replaceAll("&", "&amp;")
    .replaceAll("<", "&lt;")
    .replaceAll(">", "&gt;")
    .replaceAll('"', "&quot;")
    .replaceAll("'", "&#39;");
}

function renderSummary() {
  const el = document.getElementById("summary");
  el.innerHTML = DATA.sources.map((s) => `
    <span class="pill">${escapeHtml(s.source)}: <b>${s.instances}</b> instances,
      <b>${s.rejected_files}</b> rejected of ${s.files} files</span>
  `).join("");
}

function renderChartList() {
  const root = document.getElementById("charts");
  root.innerHTML = "";
  DATA.charts.forEach((chart, i) => {
    const row = document.createElement("div");
    row.className = "chart-item" + (state.selected === i ? " selected" : "");
    row.innerHTML = `${escapeHtml(chart.title)} <span class="muted">(${escapeHtml(chart.y_label)})</span>`;
    row.onclick = () => selectChart(i);
    root.appendChild(row);
  });
}

function renderLegend(chart) {
  const el = document.getElementById("legend");
  el.innerHTML = chart.series.map((s, i) => `
    <span><span class="swatch" style="background:${COLORS[i % COLORS.length]}"></span>${escapeHtml(s.source)}</span>
  `).join("");
}

// Grouped bars: one group per label, one bar per source, whisker = mean ± sd.
function renderPlot(chart) {
  const svg = document.getElementById("plot");
  const W = svg.width.baseVal.value, H = svg.height.baseVal.value;
  const pad = { left: 70, right: 10, top: 10, bottom: 40 };
  const plotW = W - pad.left - pad.right, plotH = H - pad.top - pad.bottom;

  let max = 0;
  for (const s of chart.series) {
    for (const b of s.bars) {
      if (b) max = Math.max(max, b.mean + (b.sd || 0));
    }
  }
  if (max <= 0) max = 1;
  const y = (v) => pad.top + plotH - (v / max) * plotH;

  const groupW = plotW / Math.max(chart.labels.length, 1);
  const barW = (groupW * 0.8) / Math.max(chart.series.length, 1);

  let out = "";
  for (let t = 0; t <= 4; t++) {
    const v = (max * t) / 4;
    out += `<line x1="${pad.left}" x2="${W - pad.right}" y1="${y(v)}" y2="${y(v)}" stroke="#eee"/>`;
    out += `<text x="${pad.left - 6}" y="${y(v) + 4}" font-size="11" text-anchor="end">${fmt(v)}</text>`;
  }
  out += `<text x="14" y="${pad.top + plotH / 2}" font-size="12" transform="rotate(-90 14 ${pad.top + plotH / 2})" text-anchor="middle">${escapeHtml(chart.y_label)}</text>`;

  chart.labels.forEach((label, g) => {
    const gx = pad.left + g * groupW + groupW * 0.1;
    chart.series.forEach((s, i) => {
      const b = s.bars[g];
      if (!b) return;
      const x = gx + i * barW;
      const color = COLORS[i % COLORS.length];
      out += `<rect x="${x}" y="${y(b.mean)}" width="${barW - 2}" height="${pad.top + plotH - y(b.mean)}" fill="${color}"/>`;
      if (b.sd !== null) {
        const cx = x + (barW - 2) / 2;
        const lo = y(Math.max(b.mean - b.sd, 0)), hi = y(b.mean + b.sd);
        out += `<line x1="${cx}" x2="${cx}" y1="${lo}" y2="${hi}" stroke="#333"/>`;
        out += `<line x1="${cx - 4}" x2="${cx + 4}" y1="${hi}" y2="${hi}" stroke="#333"/>`;
        out += `<line x1="${cx - 4}" x2="${cx + 4}" y1="${lo}" y2="${lo}" stroke="#333"/>`;
      }
    });
    out += `<text x="${pad.left + g * groupW + groupW / 2}" y="${H - pad.bottom + 18}" font-size="12" text-anchor="middle">${escapeHtml(label)}</text>`;
  });

  svg.innerHTML = out;
}

function renderTable(chart) {
  const tbl = document.getElementById("barsTable");
  const body = document.getElementById("barsBody");
  body.innerHTML = "";
  let rows = 0;
  chart.labels.forEach((label, g) => {
    for (const s of chart.series) {
      const b = s.bars[g];
      if (!b) continue;
      const tr = document.createElement("tr");
      tr.innerHTML = `
        <td>${escapeHtml(label)}</td>
        <td>${escapeHtml(s.source)}</td>
        <td class="num">${b.n}</td>
        <td class="num">${fmt(b.mean)}</td>
        <td class="num">${fmt(b.sd)}</td>
      `;
      body.appendChild(tr);
      rows++;
    }
  });
  tbl.style.display = rows ? "table" : "none";
}

function selectChart(i) {
  state.selected = i;
  const chart = DATA.charts[i];
  document.getElementById("title").textContent = chart.title;
  document.getElementById("meta").textContent =
    `${chart.series.length} sources | bars: mean, whiskers: ± sample sd`;
  renderLegend(chart);
  renderPlot(chart);
  renderTable(chart);
  renderChartList();
}

renderSummary();
renderChartList();
if (DATA.charts.length) selectChart(0);
</script>
</body>
</html>
"##;

    Ok(TEMPLATE.replace("__DATA__", &json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::{ChartView, SourceView};

    #[test]
    fn embeds_report_json() {
        let data = ReportData {
            sources: vec![SourceView {
                source: "docker".to_string(),
                files: 3,
                instances: 2,
                rejected_files: 1,
            }],
            charts: vec![ChartView {
                title: "Overall runtime".to_string(),
                y_label: "ms".to_string(),
                labels: vec!["total runtime".to_string()],
                series: vec![],
            }],
        };

        let html = render_html_report(&data).unwrap();
        assert!(!html.contains("__DATA__"));
        assert!(html.contains(r#""source":"docker""#));
        assert!(html.contains(r#""title":"Overall runtime""#));
    }

    #[test]
    fn script_close_tag_is_escaped() {
        let data = ReportData {
            sources: vec![SourceView {
                source: "</script>".to_string(),
                files: 0,
                instances: 0,
                rejected_files: 0,
            }],
            charts: vec![],
        };

        let html = render_html_report(&data).unwrap();
        assert_eq!(html.matches("</script>").count(), 1);
    }
}
