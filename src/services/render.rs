use crate::config::Config;
use crate::models::announcement::Announcement;
use crate::models::calendar::RailItem;
use crate::models::media::GalleryItem;
use crate::models::rich_text::RichTextNode;
use crate::models::schedule::ScheduleEntry;
use crate::models::sports::HomeAway;
use crate::services::clock;
use crate::services::dashboard::DashboardSnapshot;

pub const NO_WEATHER: &str = "Weather data unavailable";
pub const NO_EVENTS: &str = "No upcoming events";
pub const NO_ANNOUNCEMENTS: &str = "No announcements";
pub const NO_GAMES: &str = "No games scheduled in the past week or next three weeks";
pub const NO_GAMES_HINT: &str = "Check back later for upcoming games";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn safe_href(uri: &str) -> &str {
    let lower = uri.trim().to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") || lower.starts_with("mailto:") {
        uri.trim()
    } else {
        "#"
    }
}

/// Render a rich-text tree as HTML. Embedded entries and assets are not
/// resolvable from the delivery payload and render as a placeholder or
/// nothing.
pub fn rich_text(node: &RichTextNode) -> String {
    let mut out = String::new();
    write_node(node, &mut out);
    out
}

fn write_children(node: &RichTextNode, out: &mut String) {
    for child in &node.content {
        write_node(child, out);
    }
}

fn write_wrapped(tag: &str, node: &RichTextNode, out: &mut String) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_children(node, out);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_node(node: &RichTextNode, out: &mut String) {
    match node.node_type.as_str() {
        "text" => {
            let mut text = escape(node.value.as_deref().unwrap_or_default());
            for mark in &node.marks {
                let tag = match mark.kind.as_str() {
                    "bold" => "strong",
                    "italic" => "em",
                    "underline" => "u",
                    "code" => "code",
                    _ => continue,
                };
                text = format!("<{tag}>{text}</{tag}>");
            }
            out.push_str(&text);
        }
        "paragraph" => write_wrapped("p", node, out),
        "heading-1" => write_wrapped("h1", node, out),
        "heading-2" => write_wrapped("h2", node, out),
        "heading-3" => write_wrapped("h3", node, out),
        "heading-4" => write_wrapped("h4", node, out),
        "heading-5" => write_wrapped("h5", node, out),
        "heading-6" => write_wrapped("h6", node, out),
        "unordered-list" => write_wrapped("ul", node, out),
        "ordered-list" => write_wrapped("ol", node, out),
        "list-item" => write_wrapped("li", node, out),
        "blockquote" => write_wrapped("blockquote", node, out),
        "hr" => out.push_str("<hr>"),
        "hyperlink" => {
            let href = node.data_str(&["uri"]).map(safe_href).unwrap_or("#");
            out.push_str(&format!(
                r#"<a href="{}" target="_blank" rel="noopener noreferrer">"#,
                escape(href)
            ));
            write_children(node, out);
            out.push_str("</a>");
        }
        "embedded-entry-block" => out.push_str(r#"<p class="muted">Embedded content not rendered.</p>"#),
        "embedded-asset-block" => {}
        // document, entry/asset hyperlinks and anything unknown: keep the text
        _ => write_children(node, out),
    }
}

/// Ticker line for a game, e.g. `Final - Celtics 3 @ Trinity 1`.
/// Entries without an opponent (meets, events) have no game line.
pub fn game_line(entry: &ScheduleEntry, team_name: &str) -> Option<String> {
    let opponent = entry.opponent.as_deref()?;
    let versus = match entry.home_away {
        Some(HomeAway::Away) => "@",
        _ => "vs",
    };
    Some(match &entry.score {
        Some((ours, theirs)) => format!("Final - {team_name} {ours} {versus} {opponent} {theirs}"),
        None => format!("{team_name} {versus} {opponent}"),
    })
}

fn weather_html(snapshot: &DashboardSnapshot) -> String {
    match &snapshot.weather {
        Some(weather) => format!(
            r#"<div class="weather"><img src="{}" alt="{}"><span class="temp">{}&deg;F</span><span class="desc">{}</span></div>"#,
            escape(&weather.icon_url()),
            escape(&weather.description),
            weather.temperature,
            escape(&weather.description),
        ),
        None => format!(r#"<div class="weather muted">{NO_WEATHER}</div>"#),
    }
}

fn rail_html(rail: &[RailItem]) -> String {
    if rail.is_empty() {
        return format!(r#"<p class="muted">{NO_EVENTS}</p>"#);
    }
    let items: String = rail
        .iter()
        .map(|item| {
            let mut when = escape(&item.date_label);
            if let Some(time) = &item.time_label {
                when.push_str(" &middot; ");
                when.push_str(&escape(time));
            }
            let location = item
                .location
                .as_deref()
                .map(|l| format!(r#"<div class="location">{}</div>"#, escape(l)))
                .unwrap_or_default();
            format!(
                r#"<li><div class="when">{}</div><div class="title">{}</div>{}</li>"#,
                when,
                escape(&item.title),
                location
            )
        })
        .collect();
    format!(r#"<ul class="rail">{items}</ul>"#)
}

fn announcement_html(index: usize, announcement: &Announcement) -> String {
    let eyebrow = announcement
        .eyebrow_text
        .as_deref()
        .filter(|e| !e.trim().is_empty())
        .map(|e| format!(r#"<div class="eyebrow">{}</div>"#, escape(e)))
        .unwrap_or_default();
    let body = announcement
        .body
        .as_ref()
        .filter(|b| !b.is_empty())
        .map(|b| format!(r#"<div class="body">{}</div>"#, rich_text(b)))
        .unwrap_or_default();
    format!(
        r#"<article class="item" data-index="{}">{}<h3>{}</h3>{}</article>"#,
        index,
        eyebrow,
        escape(&announcement.headline),
        body
    )
}

fn announcement_zone(zone: &str, heading: &str, announcements: &[Announcement]) -> String {
    let inner = if announcements.is_empty() {
        format!(r#"<p class="muted">{NO_ANNOUNCEMENTS}</p>"#)
    } else {
        announcements
            .iter()
            .enumerate()
            .map(|(i, a)| announcement_html(i, a))
            .collect()
    };
    format!(
        r#"<section class="panel {zone}"><h2>{}</h2><div class="zone" data-zone="{zone}">{inner}</div></section>"#,
        escape(heading)
    )
}

fn gallery_html(gallery: &[GalleryItem]) -> String {
    if gallery.is_empty() {
        return String::new();
    }
    let slides: String = gallery
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                r#"<figure class="item" data-index="{}"><img src="{}" alt="{}"><figcaption>{}</figcaption></figure>"#,
                i,
                escape(&item.url),
                escape(&item.title),
                escape(&item.title)
            )
        })
        .collect();
    format!(
        r#"<aside class="panel gallery"><h2>Photo Gallery</h2><div class="zone" data-zone="gallery">{slides}</div></aside>"#
    )
}

fn ticker_html(schedule: &[ScheduleEntry], team_name: &str) -> String {
    if schedule.is_empty() {
        return format!(
            r#"<footer class="ticker"><section class="team">{NO_GAMES}</section><aside class="detail">{NO_GAMES_HINT}</aside></footer>"#
        );
    }
    let items: String = schedule
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let mut detail = format!(
                r#"<span class="date">{}</span>"#,
                escape(&clock::format_ticker_date(entry.starts_at, entry.all_day))
            );
            if let Some(place) = entry.place.and_then(clock::place_text) {
                detail.push_str(&format!(
                    r#"<span class="place">Final: <b>{}</b></span>"#,
                    escape(&place)
                ));
            }
            if let Some(line) = game_line(entry, team_name) {
                detail.push_str(&format!(r#"<span class="game">{}</span>"#, escape(&line)));
            }
            if let Some(location) = &entry.location {
                detail.push_str(&format!(r#"<span class="location">{}</span>"#, escape(location)));
            }
            format!(
                r#"<div class="item" data-index="{}"><section class="team">{}</section><aside class="detail">{}</aside></div>"#,
                i,
                escape(&entry.label),
                detail
            )
        })
        .collect();
    format!(r#"<footer class="ticker"><div class="zone" data-zone="ticker">{items}</div></footer>"#)
}

/// The whole kiosk page for one snapshot.
pub fn page(snapshot: &DashboardSnapshot, config: &Config) -> String {
    let school = escape(&config.branding.school_name);
    let team = &config.branding.team_name;
    let now = snapshot.generated_at;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{school}</title>
<style>{STYLE}</style>
</head>
<body>
<header>
<div class="brand"><img src="/static/logo.svg" alt=""><h1>{school}</h1></div>
<div class="clock"><div id="clock-time">{time}</div><div id="clock-date">{date}</div></div>
{weather}
</header>
<main>
<aside class="panel calendar"><h2>Upcoming Events</h2>{rail}</aside>
{school_zone}
{athletics_zone}
{gallery}
</main>
{ticker}
<script>{SCRIPT}</script>
</body>
</html>
"#,
        refresh = config.page_refresh_secs,
        time = clock::format_time(now.time()),
        date = clock::format_date(now),
        weather = weather_html(snapshot),
        rail = rail_html(&snapshot.rail),
        school_zone = announcement_zone("announcements", "School Announcements", &snapshot.announcements.school),
        athletics_zone = announcement_zone("athletics", &format!("{team} Athletics"), &snapshot.announcements.athletics),
        gallery = gallery_html(&snapshot.gallery),
        ticker = ticker_html(&snapshot.schedule, team),
    )
}

const STYLE: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;background:#f3f4f6;color:#111;display:flex;flex-direction:column;height:100vh}
header{display:flex;align-items:center;justify-content:space-between;padding:1rem 2rem;background:#065f46;color:#fff}
header .brand{display:flex;align-items:center;gap:1rem}
header .brand img{height:64px}
header .clock{text-align:center;font-size:1.6rem}
.weather{display:flex;align-items:center;gap:.5rem;font-size:1.4rem}
main{flex:1;display:grid;grid-template-columns:1fr 2fr 1.5fr 1.5fr;gap:1rem;padding:1rem;overflow:hidden}
.panel{background:#fff;border-radius:.5rem;padding:1rem;overflow:hidden}
.panel h2{margin-top:0;color:#047857}
.muted{color:#6b7280}
.rail{list-style:none;padding:0;margin:0}
.rail li{border-bottom:1px solid #e5e7eb;padding:.5rem 0}
.rail .when{font-weight:bold;color:#047857}
.zone{position:relative;height:100%}
.zone .item{transition:opacity .5s,transform .5s}
.announcements .item,.gallery .item,.ticker .item{display:none}
.announcements .item.active,.gallery .item.active,.ticker .item.active{display:block}
.athletics .zone{overflow:hidden}
.item.transitioning_out{opacity:0}
.announcements .item.transitioning_out,.ticker .item.transitioning_out{transform:translateX(-100%)}
.gallery img{width:100%;border-radius:.5rem}
.eyebrow{text-transform:uppercase;color:#6b7280;font-size:.9rem}
footer.ticker{display:flex;gap:2rem;padding:1rem;background:#f3f4f6;border-top:4px solid #065f46;font-size:1.5rem}
footer.ticker .zone{width:100%}
.ticker .item.active{display:flex;gap:2rem}
.ticker .team{width:25%;background:#065f46;color:#fff;padding:1rem;border-radius:.25rem;font-weight:bold}
.ticker .detail{display:flex;align-items:center;gap:2rem}
.ticker .date{color:#6b7280}
.ticker .place b{background:#065f46;color:#fff;padding:.5rem;border-radius:.25rem}
"#;

const SCRIPT: &str = r#"
(function () {
  var zones = {};
  document.querySelectorAll('[data-zone]').forEach(function (el) {
    var items = el.querySelectorAll('[data-index]');
    zones[el.dataset.zone] = items;
    if (items.length) items[0].classList.add('active');
  });
  function apply(frame) {
    if (frame.type === 'clock') {
      document.getElementById('clock-time').textContent = frame.time;
      document.getElementById('clock-date').textContent = frame.date;
      return;
    }
    var items = zones[frame.zone];
    if (!items) return;
    items.forEach(function (el, i) {
      el.classList.toggle('active', i === frame.index);
      el.classList.toggle('transitioning_out', i === frame.index && frame.phase === 'transitioning_out');
      el.classList.toggle('transitioning_in', i === frame.index && frame.phase === 'transitioning_in');
    });
    if (frame.style === 'scroll' && items[frame.index]) {
      items[frame.index].scrollIntoView({ behavior: 'smooth', block: 'start' });
    }
  }
  function connect() {
    var query = Object.keys(zones).map(function (z) { return z + '=' + zones[z].length; }).join('&');
    var scheme = location.protocol === 'https:' ? 'wss:' : 'ws:';
    var ws = new WebSocket(scheme + '//' + location.host + '/ws/display?' + query);
    ws.onmessage = function (e) { apply(JSON.parse(e.data)); };
    ws.onclose = function () { setTimeout(connect, 5000); };
  }
  connect();
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::announcement::{AnnouncementBuckets, AnnouncementCategory};
    use crate::models::rich_text::Mark;
    use crate::models::weather::WeatherSnapshot;
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde_json::json;

    fn config() -> Config {
        Config::from_lookup(|_| None).unwrap()
    }

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap().and_hms_opt(h, m, 0).unwrap()
    }

    fn text(value: &str, marks: &[&str]) -> RichTextNode {
        RichTextNode {
            node_type: "text".into(),
            value: Some(value.into()),
            marks: marks.iter().map(|m| Mark { kind: m.to_string() }).collect(),
            ..Default::default()
        }
    }

    fn block(node_type: &str, content: Vec<RichTextNode>) -> RichTextNode {
        RichTextNode {
            node_type: node_type.into(),
            content,
            ..Default::default()
        }
    }

    fn entry(opponent: Option<&str>, home_away: Option<HomeAway>, score: Option<(&str, &str)>) -> ScheduleEntry {
        let starts_at = at(15, 16, 30);
        ScheduleEntry {
            id: "Soccer:2".into(),
            label: "Boys Soccer".into(),
            opponent: opponent.map(str::to_string),
            home_away,
            date_text: "06/15/2024".into(),
            starts_at,
            all_day: false,
            time_label: Some("4:30 PM".into()),
            location: None,
            score: score.map(|(a, b)| (a.to_string(), b.to_string())),
            place: None,
            day: 15,
            month: "Jun".into(),
            weekday: "Sat".into(),
        }
    }

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(escape(r#"<a href="x">Tom & Jerry's</a>"#), "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;");
    }

    #[test]
    fn game_line_follows_score_and_venue() {
        assert_eq!(
            game_line(&entry(Some("Trinity"), Some(HomeAway::Home), None), "Celtics").as_deref(),
            Some("Celtics vs Trinity")
        );
        assert_eq!(
            game_line(&entry(Some("Fenwick"), Some(HomeAway::Away), Some(("3", "1"))), "Celtics").as_deref(),
            Some("Final - Celtics 3 @ Fenwick 1")
        );
        assert_eq!(game_line(&entry(None, None, None), "Celtics"), None);
    }

    #[test]
    fn rich_text_renders_blocks_marks_and_links() {
        let mut link = block("hyperlink", vec![text("tickets", &[])]);
        link.data = json!({ "uri": "https://scs.example/tickets" });
        let mut script_link = block("hyperlink", vec![text("bad", &[])]);
        script_link.data = json!({ "uri": "javascript:alert(1)" });
        let doc = block(
            "document",
            vec![
                block("heading-2", vec![text("Spirit Week", &[])]),
                block("paragraph", vec![text("Wear ", &[]), text("green", &["bold", "italic"]), link, script_link]),
                block("unordered-list", vec![block("list-item", vec![block("paragraph", vec![text("a < b", &[])])])]),
                block("embedded-entry-block", vec![]),
            ],
        );

        let html = rich_text(&doc);
        assert!(html.starts_with("<h2>Spirit Week</h2>"));
        assert!(html.contains("<em><strong>green</strong></em>"));
        assert!(html.contains(r#"<a href="https://scs.example/tickets" target="_blank" rel="noopener noreferrer">tickets</a>"#));
        assert!(html.contains(r##"<a href="#""##));
        assert!(html.contains("<ul><li><p>a &lt; b</p></li></ul>"));
        assert!(html.contains("Embedded content not rendered."));
    }

    #[test]
    fn empty_snapshot_shows_every_fallback_message() {
        let html = page(&DashboardSnapshot::empty(at(10, 15, 7)), &config());
        assert!(html.contains(NO_WEATHER));
        assert!(html.contains(NO_EVENTS));
        assert!(html.contains(NO_ANNOUNCEMENTS));
        assert!(html.contains(NO_GAMES));
        assert!(html.contains(NO_GAMES_HINT));
        assert!(!html.contains(r#"data-zone="gallery""#));
        assert!(html.contains(r#"<meta http-equiv="refresh" content="900">"#));
        assert!(html.contains(r#"<div id="clock-time">3:07 PM</div>"#));
        assert!(html.contains("Monday, June 10"));
    }

    #[test]
    fn populated_zones_are_indexed_for_the_display_socket() {
        let announcement = |id: &str, category: &str, headline: &str| Announcement {
            id: id.into(),
            eyebrow_text: Some("Reminder".into()),
            headline: headline.into(),
            category: AnnouncementCategory::from(category),
            body: None,
            publish_date: DateTime::parse_from_rfc3339("2024-06-01T08:00:00-05:00").unwrap(),
            unpublish_date: None,
        };
        let mut snapshot = DashboardSnapshot::empty(at(10, 9, 0));
        snapshot.weather = Some(WeatherSnapshot {
            temperature: 72,
            description: "clear sky".into(),
            icon: "01d".into(),
        });
        snapshot.announcements = AnnouncementBuckets::partition(vec![
            announcement("a", "School", "Picture <Day>"),
            announcement("b", "School", "Field Trip"),
            announcement("c", "Athletics", "Sectionals"),
        ]);
        snapshot.gallery = vec![GalleryItem {
            url: "https://images.example/band.jpg".into(),
            title: "Band".into(),
        }];
        snapshot.schedule = vec![entry(Some("Trinity"), None, None)];

        let html = page(&snapshot, &config());
        assert!(html.contains("72&deg;F"));
        assert!(html.contains("Picture &lt;Day&gt;"));
        assert!(html.contains(r#"<article class="item" data-index="1"><div class="eyebrow">Reminder</div><h3>Field Trip</h3>"#));
        assert!(html.contains("Celtics Athletics"));
        assert!(html.contains(r#"data-zone="gallery""#));
        assert!(html.contains("June 15 at 4:30 PM"));
        assert!(html.contains("Celtics vs Trinity"));
        assert!(!html.contains(NO_ANNOUNCEMENTS));
        assert!(!html.contains(NO_GAMES));
    }
}
