//! Static HTML page generation.
//!
//! Renders the stored schedule into a self-contained page that reuses the
//! site's existing `css/styles.css` and `js/app.js` assets. Entries arrive
//! pre-sorted by day, start time and group; the renderer only groups them
//! into day sections and emits one card per class.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use tokio::fs;
use tracing::info;

use crate::domain::StoredEntry;

/// Day name, pill/section id, English label. Rendering order.
const DAY_META: [(&str, &str, &str); 7] = [
    ("Poniedziałek", "pn", "Monday"),
    ("Wtorek", "wt", "Tuesday"),
    ("Środa", "sr", "Wednesday"),
    ("Czwartek", "czw", "Thursday"),
    ("Piątek", "pi", "Friday"),
    ("Sobota", "sob", "Saturday"),
    ("Niedziela", "nd", "Sunday"),
];

/// Class type → CSS badge class (`data-type` attribute).
const TYPE_CSS: [(&str, &str); 8] = [
    ("Wykład", "wyk"),
    ("Ćwiczenia", "cw"),
    ("Laboratorium", "lab"),
    ("Warsztaty", "war"),
    ("Konwersatorium", "kw"),
    ("Seminarium", "sem"),
    ("Projekt", "proj"),
    ("Lektorat", "lek"),
];

/// Class mode → (display label, CSS class).
const MODE_BADGE: [(&str, &str, &str); 5] = [
    ("Teams", "Teams", "mode-teams"),
    ("w kontakcie", "w sali", "mode-sala"),
    ("Zdalnie", "Zdalnie", "mode-zdal"),
    ("Hybrydowo", "Hybrydowo", "mode-hyb"),
    ("Online", "Online", "mode-teams"),
];

const SVG_PERSON: &str = "<svg width=\"14\" height=\"14\" fill=\"none\" viewBox=\"0 0 24 24\" \
stroke=\"currentColor\" stroke-width=\"2\"><path stroke-linecap=\"round\" \
stroke-linejoin=\"round\" d=\"M16 7a4 4 0 11-8 0 4 4 0 018 0zM12 14a7 7 0 00-7 7h14a7 7 0 \
00-7-7z\"/></svg>";

const SVG_ROOM: &str = "<svg width=\"14\" height=\"14\" fill=\"none\" viewBox=\"0 0 24 24\" \
stroke=\"currentColor\" stroke-width=\"2\"><path stroke-linecap=\"round\" \
stroke-linejoin=\"round\" d=\"M19 21V5a2 2 0 00-2-2H7a2 2 0 00-2 2v16m14 0h2m-2 0h-5m-9 \
0H3m2 0h5M9 7h1m-1 4h1m4-4h1m-1 4h1m-5 10v-5a1 1 0 011-1h2a1 1 0 011 1v5m-4 0h4\"/></svg>";

const SVG_GROUP: &str = "<svg width=\"14\" height=\"14\" fill=\"none\" viewBox=\"0 0 24 24\" \
stroke=\"currentColor\" stroke-width=\"2\"><path stroke-linecap=\"round\" \
stroke-linejoin=\"round\" d=\"M17 20h5v-2a3 3 0 00-5.356-1.857M17 20H7m10 0v-2c0-.656-.126-\
1.283-.356-1.857M7 20H2v-2a3 3 0 015.356-1.857M7 20v-2c0-.656.126-1.283.356-1.857m0 0a5.002 \
5.002 0 019.288 0M15 7a3 3 0 11-6 0 3 3 0 016 0z\"/></svg>";

pub struct HtmlRenderer {
    groups: Vec<String>,
}

impl HtmlRenderer {
    pub fn new(groups: Vec<String>) -> Self {
        Self { groups }
    }

    /// Render the full page and write it to `out_path`.
    pub async fn write_to(&self, entries: &[StoredEntry], out_path: &Path) -> Result<()> {
        let html = self.render(entries);
        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .context("Failed to create output directory")?;
            }
        }
        fs::write(out_path, html)
            .await
            .with_context(|| format!("Failed to write HTML to {out_path:?}"))?;
        info!("🌐 HTML written to {}", out_path.display());
        Ok(())
    }

    /// Render the complete page as a string.
    pub fn render(&self, entries: &[StoredEntry]) -> String {
        info!("Generating HTML from {} schedule entries…", entries.len());

        let mut by_day: HashMap<&str, Vec<&StoredEntry>> = HashMap::new();
        for entry in entries {
            by_day.entry(entry.day.as_str()).or_default().push(entry);
        }

        let empty = Vec::new();
        let mut sections = String::new();
        for (day, short, english) in DAY_META {
            let day_entries = by_day.get(day).unwrap_or(&empty);
            sections.push_str(&day_section(day, short, english, day_entries));
        }

        let mut html = String::with_capacity(64 * 1024);
        html.push_str(PAGE_HEAD);
        html.push_str(&stats_bar(entries.len(), self.groups.len()));
        html.push_str(&group_filter(&self.groups));
        html.push_str(&day_filter());
        html.push_str(SECTIONS_BANNER);
        html.push_str(&sections);
        html.push_str("\n\n");
        html.push_str(LEGEND);
        html.push_str(&self.footer());
        html.push_str(PAGE_TAIL);
        html
    }

    fn footer(&self) -> String {
        let now = Local::now().format("%d.%m.%Y");
        let groups_summary = if self.groups.is_empty() {
            "Zarządzanie".to_string()
        } else {
            self.groups.join(", ")
        };
        format!(
            "  <!-- ── FOOTER ─────────────────────────────────────────────────────────────── -->\n\
             \x20 <footer class=\"site-footer\">\n\
             \x20   <p>Plan wygenerowany: <strong>{now}</strong> &bull;\n\
             \x20      Grupy: <strong>{}</strong> &bull;\n\
             \x20      Źródło: <a href=\"https://san.edu.pl/plany-zajec-warszawa/studia-stacjonarne\" target=\"_blank\" rel=\"noopener noreferrer\">san.edu.pl</a></p>\n\
             \x20   <p style=\"margin-top:4px\">Prosimy o sprawdzanie planu przed zajęciami. Plan oraz sale mogą ulec zmianie.</p>\n\
             \x20 </footer>\n\n",
            escape(&groups_summary)
        )
    }
}

/// Minimal HTML escaping. Ampersand first so entities survive intact.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Human-readable duration between two `HH:MM` times.
///
/// Multiples of the 45-minute teaching unit render as "N × 45 min".
fn duration(start: &str, end: &str) -> String {
    let (Ok(start), Ok(end)) = (
        NaiveTime::parse_from_str(start, "%H:%M"),
        NaiveTime::parse_from_str(end, "%H:%M"),
    ) else {
        return String::new();
    };

    let mins = (end - start).num_minutes();
    if mins <= 0 {
        return String::new();
    }
    if mins % 45 == 0 && mins >= 90 {
        return format!("{} × 45 min", mins / 45);
    }
    format!("{mins} min")
}

fn type_badge_css(class_type: &str) -> &'static str {
    TYPE_CSS
        .iter()
        .find(|(label, _)| *label == class_type)
        .map(|(_, css)| *css)
        .unwrap_or("wyk")
}

fn mode_badge(class_mode: &str) -> Option<(&'static str, &'static str)> {
    MODE_BADGE
        .iter()
        .find(|(mode, _, _)| *mode == class_mode)
        .map(|(_, label, css)| (*label, *css))
}

/// One `<article class="class-card">` block.
fn card_html(entry: &StoredEntry, card_id: &str) -> String {
    let ts = escape(&entry.time_start);
    let te = escape(&entry.time_end);
    let dur = duration(&entry.time_start, &entry.time_end);
    let subject = escape(&entry.subject);
    let css = type_badge_css(&entry.class_type);
    let instructor = escape(&entry.instructor);
    let group = escape(&entry.group_name);

    let room_html = if entry.room.contains(',') {
        let room_detail = escape(&entry.room);
        format!(" Różne sale <strong title=\"{room_detail}\">{room_detail}</strong>")
    } else if !entry.room.is_empty() {
        format!(" Sala <strong>{}</strong>", escape(&entry.room))
    } else {
        String::new()
    };

    let mode_badge_html = match mode_badge(&entry.class_mode) {
        Some((label, css)) => format!(" <span class=\"mode-badge {css}\">{label}</span>"),
        None => String::new(),
    };

    let type_badge_html = if entry.class_type.is_empty() {
        String::new()
    } else {
        format!(
            "<span class=\"type-badge {css}\">{}</span>",
            escape(&entry.class_type)
        )
    };

    let dates_id = format!("dates-{card_id}");
    let date_chips: String = entry
        .dates
        .iter()
        .map(|d| format!("<span class=\"date-chip\">{}</span>", escape(d)))
        .collect();

    let time_sep_style = if dur.contains('×') {
        " style=\"min-height:28px\""
    } else {
        ""
    };

    let change_banner = if entry.is_changed {
        "        <div class=\"change-badge\"><span class=\"change-icon\">⚠</span> Zmiana w planie</div>"
    } else {
        ""
    };

    let mut lines = vec![
        format!("      <article class=\"class-card\" data-type=\"{css}\" data-group=\"{group}\">"),
        change_banner.to_string(),
        "        <div class=\"card-time\">".to_string(),
        format!("          <span class=\"time-start\">{ts}</span>"),
        format!("          <div class=\"time-sep\"{time_sep_style}></div>"),
        format!("          <span class=\"time-end\">{te}</span>"),
    ];
    if !dur.is_empty() {
        lines.push(format!("          <span class=\"time-duration\">{dur}</span>"));
    }
    lines.extend([
        "        </div>".to_string(),
        "        <div class=\"card-content\">".to_string(),
        "          <div class=\"card-top\">".to_string(),
        format!("            <h3 class=\"card-subject\">{subject}</h3>"),
        "            <div class=\"badge-group\">".to_string(),
        format!("              {type_badge_html}"),
        format!("              {mode_badge_html}"),
        "            </div>".to_string(),
        "          </div>".to_string(),
        "          <div class=\"card-meta\">".to_string(),
    ]);
    if !instructor.is_empty() {
        lines.push(format!(
            "            <span class=\"meta-item\">{SVG_PERSON} <strong>{instructor}</strong></span>"
        ));
    }
    if !room_html.is_empty() {
        lines.push(format!(
            "            <span class=\"meta-item\">{SVG_ROOM}{room_html}</span>"
        ));
    }
    if !group.is_empty() {
        lines.push(format!(
            "            <span class=\"meta-item\">{SVG_GROUP} <strong>{group}</strong></span>"
        ));
    }
    lines.push("          </div>".to_string());
    if !entry.dates.is_empty() {
        lines.extend([
            "          <div class=\"card-dates\">".to_string(),
            format!("            <span class=\"dates-toggle\" data-target=\"{dates_id}\">"),
            format!(
                "              <span class=\"arrow\">›</span> Pokaż terminy ({} zajęć)",
                entry.dates.len()
            ),
            "            </span>".to_string(),
            format!("            <div class=\"dates-grid\" id=\"{dates_id}\">"),
            format!("              {date_chips}"),
            "            </div>".to_string(),
            "          </div>".to_string(),
        ]);
    }
    lines.extend(["        </div>".to_string(), "      </article>".to_string()]);
    lines.join("\n")
}

/// One `<section class="day-section">` with all of the day's cards.
fn day_section(day_name: &str, short: &str, english: &str, entries: &[&StoredEntry]) -> String {
    let cards: Vec<String> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| card_html(entry, &format!("{short}{}", idx + 1)))
        .collect();

    let inner = if cards.is_empty() {
        "\n    <div class=\"day-empty\">Brak zajęć w tym dniu</div>".to_string()
    } else {
        format!(
            "\n    <div class=\"cards-list\">\n{}\n    </div>",
            cards.join("\n")
        )
    };

    format!(
        "\n  <!-- ── {} ──────────────────────────────────────── -->\n\
         \x20 <section class=\"day-section\" data-day=\"{short}\" id=\"day-{short}\">\n\
         \x20   <div class=\"day-header\">\n\
         \x20     <span class=\"day-name\">{day_name}</span>\n\
         \x20     <span class=\"day-name-pl\">{english}</span>\n\
         \x20     <div class=\"day-divider\"></div>\n\
         \x20   </div>{inner}\n\
         \x20 </section>",
        day_name.to_uppercase()
    )
}

fn stats_bar(entry_count: usize, group_count: usize) -> String {
    format!(
        "  <!-- ── STATS BAR ─────────────────────────────────────────────────────────── -->\n\
         \x20 <div class=\"stats-bar\">\n\
         \x20   <div class=\"stat-chip\"><span class=\"dot\" style=\"background:#2563EB\"></span>{entry_count} zajęć</div>\n\
         \x20   <div class=\"stat-chip\"><span class=\"dot\" style=\"background:#22C55E\"></span>{group_count} grup</div>\n\
         \x20   <div class=\"stat-chip\"><span class=\"dot\" style=\"background:#7C3AED\"></span>Sem. letni 2025/26</div>\n\
         \x20   <div class=\"stat-chip\"><span class=\"dot\" style=\"background:#F59E0B\"></span>Łucka 11, Warszawa</div>\n\
         \x20 </div>\n\n"
    )
}

fn group_filter(groups: &[String]) -> String {
    let mut buttons =
        vec!["    <button class=\"day-pill active\" data-group=\"all\">Wszystkie grupy</button>".to_string()];
    for group in groups {
        let g = escape(group);
        buttons.push(format!(
            "    <button class=\"day-pill\" data-group=\"{g}\">{g}</button>"
        ));
    }
    format!(
        "  <!-- ── GROUP FILTER ─────────────────────────────────────────────────────── -->\n\
         \x20 <div class=\"day-filter\" role=\"group\" aria-label=\"Filtruj według grupy\" id=\"groupFilter\">\n\
         \x20   <span class=\"day-filter-label\">Grupa:</span>\n\
         {}\n\
         \x20 </div>\n\n",
        buttons.join("\n")
    )
}

fn day_filter() -> String {
    let mut pills =
        vec!["    <button class=\"day-pill active\" data-filter=\"all\">Wszystkie</button>".to_string()];
    for (day_name, short, _) in DAY_META {
        pills.push(format!(
            "    <button class=\"day-pill\" data-filter=\"{short}\">{day_name}</button>"
        ));
    }
    format!(
        "  <!-- ── DAY FILTER ────────────────────────────────────────────────────────── -->\n\
         \x20 <div class=\"day-filter\" role=\"group\" aria-label=\"Filtruj według dnia\">\n\
         \x20   <span class=\"day-filter-label\">Dzień:</span>\n\
         {}\n\
         \x20 </div>\n\n",
        pills.join("\n")
    )
}

const PAGE_HEAD: &str = r#"<!DOCTYPE html>
<html lang="pl" data-theme="light">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="Content-Security-Policy" content="
    default-src 'self';
    script-src 'self' 'unsafe-inline';
    style-src 'self' 'unsafe-inline' https://fonts.googleapis.com;
    font-src https://fonts.gstatic.com;
    img-src 'self' data:;
    connect-src 'none';
    object-src 'none';
    base-uri 'self';
    form-action 'none';
  " />
  <title>Zarządzanie II — Plan Zajęć</title>
  <link rel="preconnect" href="https://fonts.googleapis.com" />
  <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin />
  <link href="https://fonts.googleapis.com/css2?family=Inter:wght@300;400;500;600;700&display=swap" rel="stylesheet" />
  <link rel="stylesheet" href="css/styles.css" />
</head>
<body>

<div class="page-wrapper">

  <!-- ── HEADER ───────────────────────────────────────────────────────────── -->
  <header class="site-header">
    <div class="header-brand">
      <span class="header-eyebrow">Społeczna Akademia Nauk · Warszawa</span>
      <h1 class="header-title">Zarządzanie II — Plan Zajęć</h1>
      <p class="header-subtitle">Grupy: gr1 &bull; gr2 &bull; gr3 &mdash; studia stacjonarne &bull; rok akad. 2025/26</p>
    </div>
    <div class="header-actions">
      <button class="wb-open-btn" id="wbOpenBtn" aria-label="Otwórz tablicę">
        <svg viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2"><rect x="3" y="3" width="18" height="18" rx="2"/><path d="M12 20h9M16.5 3.5a2.12 2.12 0 013 3L7 19l-4 1 1-4L16.5 3.5z"/></svg>
        Whiteboard
      </button>
      <div class="theme-toggle" id="themeToggle" role="button" aria-label="Przełącz tryb ciemny" tabindex="0">
        <span class="theme-toggle-label" id="themeLabel">Jasny</span>
        <div class="toggle-track" id="toggleTrack">
          <div class="toggle-thumb"></div>
        </div>
      </div>
    </div>
  </header>

"#;

const SECTIONS_BANNER: &str = r#"  <!-- ═══════════════════════════════════════════════════════════════════════
       SCHEDULE SECTIONS (auto-generated — do not edit manually)
  ════════════════════════════════════════════════════════════════════════ -->
"#;

const LEGEND: &str = r#"  <!-- ── LEGEND ─────────────────────────────────────────────────────────────── -->
  <div class="legend">
    <span class="legend-title">Legenda typów zajęć</span>
    <div class="legend-item"><span class="legend-dot" style="background:#2563EB"></span>Wykład (wyk)</div>
    <div class="legend-item"><span class="legend-dot" style="background:#2563EB"></span>Warsztaty (war)</div>
    <div class="legend-item"><span class="legend-dot" style="background:#059669"></span>Ćwiczenia (cw)</div>
    <div class="legend-item"><span class="legend-dot" style="background:#D97706"></span>Konwersatorium (kw)</div>
    <div class="legend-item"><span class="legend-dot" style="background:#7C3AED"></span>Laboratorium (lab)</div>
    <div class="legend-item"><span class="legend-dot" style="background:#BE185D"></span>Seminarium (sem)</div>
  </div>

"#;

const PAGE_TAIL: &str = r#"</div><!-- /page-wrapper -->

<script src="js/app.js"></script>
<script>
  /* ── GROUP FILTER ──────────────────────────────────────────────────────── */
  (function () {
    const groupBtns  = document.querySelectorAll('#groupFilter .day-pill');
    const cards      = document.querySelectorAll('.class-card');
    const sections   = document.querySelectorAll('.day-section');

    function applyGroupFilter(g) {
      cards.forEach(card => {
        const grp = card.dataset.group || '';
        card.style.display = (g === 'all' || grp === g) ? '' : 'none';
      });

      // Show/hide group-aware empty message per day section
      sections.forEach(section => {
        const list    = section.querySelector('.cards-list');
        if (!list) return;          // day already has "Brak zajęć w tym dniu"
        let emptyMsg  = section.querySelector('.day-empty-group');
        const visible = [...list.querySelectorAll('.class-card')]
                          .some(c => c.style.display !== 'none');
        if (!visible) {
          if (!emptyMsg) {
            emptyMsg = document.createElement('div');
            emptyMsg.className = 'day-empty day-empty-group';
            list.after(emptyMsg);
          }
          emptyMsg.textContent = g === 'all'
            ? 'Brak zajęć w tym dniu'
            : `Brak zajęć dla grupy ${g}`;
          emptyMsg.style.display = '';
          list.style.display = 'none';
        } else {
          if (emptyMsg) emptyMsg.style.display = 'none';
          list.style.display = '';
        }
      });
    }

    groupBtns.forEach(btn => {
      btn.addEventListener('click', () => {
        groupBtns.forEach(b => b.classList.remove('active'));
        btn.classList.add('active');
        applyGroupFilter(btn.dataset.group);
      });
    });
  })();
</script>

<!-- Whiteboard overlay (shared with schedule.html) -->
<script src="js/whiteboard.js"></script>
</body>
</html>
"#;
