//! Line scanners that turn a free-text model reply into structured annotations.
//!
//! Both scanners are total: a reply that matches none of the expected markers
//! degrades to a truncated excerpt (summaries) or an empty list (todos).

/// Key points beyond this count are dropped, first-seen order kept.
pub const MAX_KEY_POINTS: usize = 5;

/// Length of the excerpt used whenever a reply or a note has to be quoted verbatim.
pub const PREVIEW_CHARS: usize = 200;

const SUMMARY_MARKERS: &[&str] = &["özet:", "summary:"];
const KEY_POINT_MARKERS: &[&str] = &["anahtar", "key", "nokta"];
const TODO_MARKER: &str = "TODOS:";
const NO_TODO_MARKER: &str = "NO_TODOS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummarySection {
    None,
    Summary,
    KeyPoints,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TodoSection {
    Outside,
    Inside,
}

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// The first [`PREVIEW_CHARS`] characters of `text`, with `...` appended when something was cut.
pub fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

fn is_bullet(line: &str) -> bool {
    line.starts_with('-') || line.starts_with('•') || line.starts_with('*')
}

fn strip_bullet(line: &str) -> &str {
    line.trim_start_matches(|c| matches!(c, '-' | '•' | '*' | ' ')).trim()
}

fn non_blank_lines(raw: &str) -> impl Iterator<Item = &str> {
    raw.trim().split('\n').map(str::trim).filter(|line| !line.is_empty())
}

/// Splits a reply into its summary and at most [`MAX_KEY_POINTS`] key points.
///
/// Recognises `Özet:` / `Summary:` section headers, key-point headers (`Anahtar Noktalar`,
/// `Key points`) and bulleted lines anywhere in the reply. When no summary text is found the
/// summary is a [`preview`] of the raw reply.
pub fn parse_summary(raw: &str) -> (String, Vec<String>) {
    let mut section = SummarySection::None;
    let mut summary = String::new();
    let mut key_points = Vec::new();

    for line in non_blank_lines(raw) {
        let lower = line.to_lowercase();

        if SUMMARY_MARKERS.iter().any(|marker| lower.contains(marker)) {
            section = SummarySection::Summary;
            let inline = line.split_once(':').map(|(_, rest)| rest.trim()).unwrap_or("");
            if !inline.is_empty() {
                summary = inline.to_string();
            }
        } else if KEY_POINT_MARKERS.iter().any(|marker| lower.contains(marker)) {
            section = SummarySection::KeyPoints;
        } else if section == SummarySection::Summary && summary.is_empty() {
            summary = line.to_string();
        } else if section == SummarySection::KeyPoints || is_bullet(line) {
            let point = strip_bullet(line);
            if !point.is_empty() && key_points.len() < MAX_KEY_POINTS {
                key_points.push(point.to_string());
            }
        } else if section == SummarySection::Summary {
            summary.push(' ');
            summary.push_str(line);
        }
    }

    if summary.is_empty() {
        summary = preview(raw);
    }

    (summary, key_points)
}

/// Collects the items of a `TODOS:` block. Scanning stops at the first `NO_TODOS` line.
///
/// Inside the block every non-blank line is an item, bulleted or not, and there is no cap.
pub fn parse_todos(raw: &str) -> Vec<String> {
    let mut section = TodoSection::Outside;
    let mut todos = Vec::new();

    for line in non_blank_lines(raw) {
        let upper = line.to_uppercase();

        if upper.contains(TODO_MARKER) {
            section = TodoSection::Inside;
            continue;
        }
        if upper.contains(NO_TODO_MARKER) {
            break;
        }
        if section == TodoSection::Outside {
            continue;
        }

        if is_bullet(line) {
            let todo = strip_bullet(line);
            if !todo.is_empty() {
                todos.push(todo.to_string());
            }
        } else {
            todos.push(line.to_string());
        }
    }

    todos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("Yarın sunum dosyasını tamamla ve Ali'ye gönder"), 7);
        assert_eq!(word_count("one\n\ntwo   three"), 3);
    }

    #[test]
    fn test_preview_counts_characters() {
        assert_eq!(preview("kısa not"), "kısa not");
        let exact = "ş".repeat(PREVIEW_CHARS);
        assert_eq!(preview(&exact), exact);
        let long = "ğ".repeat(PREVIEW_CHARS + 1);
        assert_eq!(preview(&long), format!("{}...", "ğ".repeat(PREVIEW_CHARS)));
    }

    #[test]
    fn test_summary_with_inline_text_and_bullets() {
        let raw = "Özet: Haftalık plan hazırlandı.\n- Rapor yazılacak\n- Toplantı ayarlanacak\n";
        let (summary, points) = parse_summary(raw);
        assert_eq!(summary, "Haftalık plan hazırlandı.");
        assert_eq!(points, vec!["Rapor yazılacak", "Toplantı ayarlanacak"]);
    }

    #[test]
    fn test_key_points_capped_at_five() {
        let bullets = (1..=7).map(|i| format!("- madde {}", i)).collect::<Vec<_>>().join("\n");
        let raw = format!("Özet: X\n{}", bullets);
        let (summary, points) = parse_summary(&raw);
        assert_eq!(summary, "X");
        assert_eq!(points, vec!["madde 1", "madde 2", "madde 3", "madde 4", "madde 5"]);
    }

    #[test]
    fn test_numbered_sections_from_prompt_format() {
        let raw = "1. Özet:\nProje takvimi gözden geçirildi.\nEkip yeni hedefleri onayladı.\n\n\
                   2. Anahtar Noktalar:\nTakvim iki hafta uzadı\n• Bütçe değişmedi\n";
        let (summary, points) = parse_summary(raw);
        assert_eq!(summary, "Proje takvimi gözden geçirildi. Ekip yeni hedefleri onayladı.");
        assert_eq!(points, vec!["Takvim iki hafta uzadı", "Bütçe değişmedi"]);
    }

    #[test]
    fn test_marker_wins_over_bullet() {
        let raw = "Summary: Release is ready\n- Key dates are fixed\n- Ship on Monday";
        let (summary, points) = parse_summary(raw);
        assert_eq!(summary, "Release is ready");
        // the bulleted "Key ..." line switches sections instead of becoming a point
        assert_eq!(points, vec!["Ship on Monday"]);
    }

    #[test]
    fn test_markers_are_case_insensitive() {
        let (summary, points) = parse_summary("ÖZET: Büyük harf\nANAHTAR NOKTALAR\nbir\niki");
        assert_eq!(summary, "Büyük harf");
        assert_eq!(points, vec!["bir", "iki"]);
    }

    #[test]
    fn test_unstructured_reply_falls_back_to_preview() {
        let raw = "Bu yanıt hiçbir beklenen biçime uymuyor ".repeat(10);
        assert!(raw.chars().count() > PREVIEW_CHARS);
        let (summary, points) = parse_summary(&raw);
        assert_eq!(summary, format!("{}...", raw.chars().take(PREVIEW_CHARS).collect::<String>()));
        assert!(points.is_empty());

        let (summary, points) = parse_summary("short free text");
        assert_eq!(summary, "short free text");
        assert!(points.is_empty());
    }

    #[test]
    fn test_stray_bullets_without_summary() {
        let (summary, points) = parse_summary("- first\n- second");
        assert_eq!(summary, "- first\n- second");
        assert_eq!(points, vec!["first", "second"]);
    }

    #[test]
    fn test_parse_todos_block() {
        assert_eq!(parse_todos("TODOS:\n- a\n- b\n"), vec!["a", "b"]);
        assert_eq!(parse_todos("Açıklama\ntodos:\n* Süt al\n• Ekmek al"), vec!["Süt al", "Ekmek al"]);
    }

    #[test]
    fn test_parse_todos_no_todos() {
        assert!(parse_todos("NO_TODOS").is_empty());
        assert!(parse_todos("").is_empty());
        assert!(parse_todos("- bullet before any marker").is_empty());
    }

    #[test]
    fn test_parse_todos_stops_at_sentinel() {
        let raw = "TODOS:\n- a\nNO_TODOS\n- b\n- c";
        assert_eq!(parse_todos(raw), vec!["a"]);
        assert!(parse_todos("NO_TODOS\nTODOS:\n- a").is_empty());
    }

    #[test]
    fn test_parse_todos_keeps_unbulleted_lines() {
        let raw = "TODOS:\nRaporu gönder\n-   \n- Faturayı öde";
        assert_eq!(parse_todos(raw), vec!["Raporu gönder", "Faturayı öde"]);
    }

    #[test]
    fn test_parsers_are_idempotent() {
        let raw = "Özet: tekrar\n- bir\n- iki";
        assert_eq!(parse_summary(raw), parse_summary(raw));
        let raw = "TODOS:\n- bir\n- iki";
        assert_eq!(parse_todos(raw), parse_todos(raw));
    }
}
