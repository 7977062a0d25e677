//! Splitting raw manuscript text into bounded, ordered chunks
//!
//! Chapter headings are detected with a small set of line-anchored patterns;
//! the pattern with the most matches wins. Text without at least two headings
//! falls back to paragraph packing. All lengths are counted in characters.

use crate::config::SegmenterConfig;
use lorekeeper_domain::Chunk;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static pattern is valid")
}

/// Heading number and the rest of the line
///
/// A roman numeral must stand alone or be followed by a separator, so prose
/// such as "Part civil war" or "Chapter mid-morning" is not a heading.
const NUMBER_TAIL: &str = r"(?:\d+\b.*|[ivxlcdm]+[ \t]*(?:[:.\-—–](?:[ \t].*)?)?)$";

/// Heading patterns in priority order (ties go to the earlier one)
static HEADING_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    vec![
        (
            "numbered chinese chapter",
            compile(r"(?m)^[ \t\u{3000}]*第[一二三四五六七八九十百千万零〇两\d]+[章回节].*$"),
        ),
        (
            "chapter n",
            compile(&format!(r"(?mi)^[ \t]*chapter[ \t]*{}", NUMBER_TAIL)),
        ),
        (
            "part/book/volume n",
            compile(&format!(r"(?mi)^[ \t]*(?:part|book|volume)[ \t]+{}", NUMBER_TAIL)),
        ),
        ("markdown heading", compile(r"(?m)^#{1,3}[ \t]+\S.*$")),
    ]
});

static URL_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^[ \t]*(?:https?://|www\.)\S*[ \t]*$"));

static SEPARATOR_LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[ \t]*[-=*_~—·•.●○☆★─━]{3,}[ \t]*$"));

static NOTICE: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)免费阅读|全文阅读|txt下载|下载地址|最新章节|求月票|求推荐票|求收藏|read (?:it )?for free|free download|download (?:the )?(?:txt|epub|full)|vote for (?:this|the|my) (?:book|story)|please vote",
    )
});

static METADATA_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?i)作者|内容简介|简介|字数|连载|完结|更新时间|标签|出版社|版权|\bauthor\b|\bisbn\b|\bcopyright\b|all rights reserved|\bpublisher\b|word count|\bsynopsis\b",
    )
});

/// Notices are only stripped from short lines; prose may mention the same words.
const MAX_NOTICE_LINE_CHARS: usize = 80;

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Splits text into chunks according to a [`SegmenterConfig`]
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    /// Create a segmenter
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Limits in use
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment `text` into ordered chunks
    ///
    /// # Examples
    ///
    /// ```
    /// use lorekeeper_extractor::{Segmenter, SegmenterConfig};
    ///
    /// let body = "The tide came in slowly over the black rocks of the bay.\n\n".repeat(3);
    /// let text = format!("Chapter 1\n\n{body}Chapter 2\n\n{body}");
    /// let chunks = Segmenter::new(SegmenterConfig::default()).segment(&text);
    ///
    /// assert_eq!(chunks.len(), 2);
    /// assert_eq!(chunks[1].chapter_label.as_deref(), Some("Chapter 2"));
    /// ```
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let cleaned = preprocess(text);
        if cleaned.is_empty() {
            return Vec::new();
        }

        let candidates = match best_heading_pattern(&cleaned) {
            Some((name, pattern)) => {
                debug!("Splitting on {} headings", name);
                self.split_chapters(&cleaned, pattern)
            }
            None => {
                debug!("No chapter structure detected, splitting on paragraphs");
                let mut out = Vec::new();
                self.push_section(&mut out, &cleaned, None);
                out
            }
        };

        let total = candidates.len();
        let chunks: Vec<Chunk> = candidates
            .into_iter()
            .filter(|chunk| !self.is_noise(&chunk.text))
            .collect();
        debug!(
            "Segmented {} chars into {} chunks ({} dropped as noise)",
            char_len(&cleaned),
            chunks.len(),
            total - chunks.len()
        );
        chunks
    }

    fn split_chapters(&self, text: &str, pattern: &Regex) -> Vec<Chunk> {
        let mut out = Vec::new();
        let mut label: Option<String> = None;
        let mut last = 0;

        for heading in pattern.find_iter(text) {
            self.push_section(&mut out, &text[last..heading.start()], label.take());
            label = Some(heading.as_str().trim().to_string());
            last = heading.end();
        }
        self.push_section(&mut out, &text[last..], label);
        out
    }

    fn push_section(&self, out: &mut Vec<Chunk>, body: &str, label: Option<String>) {
        let body = body.trim();
        if body.is_empty() {
            return;
        }
        for piece in self.pack(body) {
            out.push(Chunk::new(piece, label.clone()));
        }
    }

    /// Pack paragraphs into pieces of at most `max_chunk_length` characters
    fn pack(&self, body: &str) -> Vec<String> {
        let max = self.config.max_chunk_length;
        if char_len(body) <= max {
            return vec![body.to_string()];
        }

        let mut packer = Packer::new(max, "\n\n");
        for paragraph in body.split("\n\n").map(str::trim).filter(|p| !p.is_empty()) {
            if char_len(paragraph) <= max {
                packer.push(paragraph);
                continue;
            }
            // Oversized paragraph: fall back to lines, then to raw characters.
            let mut lines = Packer::new(max, "\n");
            for line in paragraph.lines().map(str::trim).filter(|l| !l.is_empty()) {
                if char_len(line) <= max {
                    lines.push(line);
                } else {
                    lines.extend_whole(hard_split(line, max));
                }
            }
            packer.extend_whole(lines.finish());
        }
        packer.finish()
    }

    /// Too short to carry information, or reads like a metadata block
    fn is_noise(&self, text: &str) -> bool {
        if char_len(text) < self.config.min_chunk_length {
            return true;
        }
        metadata_hits(text) >= self.config.metadata_hit_threshold
    }
}

/// Segment with default limits and the given maximum chunk length
pub fn segment(text: &str, max_chunk_length: usize) -> Vec<Chunk> {
    Segmenter::new(SegmenterConfig::with_max_chunk_length(max_chunk_length)).segment(text)
}

/// Normalise line endings, strip boilerplate lines, collapse blank runs
fn preprocess(text: &str) -> String {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut out = String::with_capacity(normalized.len());
    let mut blank_run = 0;
    for line in normalized.lines().map(str::trim_end) {
        if is_boilerplate_line(line) {
            continue;
        }
        if line.trim().is_empty() {
            blank_run += 1;
            continue;
        }
        if !out.is_empty() {
            out.push_str(if blank_run > 0 { "\n\n" } else { "\n" });
        }
        blank_run = 0;
        out.push_str(line);
    }
    out
}

fn is_boilerplate_line(line: &str) -> bool {
    if URL_LINE.is_match(line) || SEPARATOR_LINE.is_match(line) {
        return true;
    }
    char_len(line) <= MAX_NOTICE_LINE_CHARS && NOTICE.is_match(line)
}

fn best_heading_pattern(text: &str) -> Option<(&'static str, &'static Regex)> {
    let mut best: Option<(&'static str, &'static Regex, usize)> = None;
    for (name, pattern) in HEADING_PATTERNS.iter() {
        let count = pattern.find_iter(text).count();
        if best.is_none_or(|(_, _, best_count)| count > best_count) {
            best = Some((*name, pattern, count));
        }
    }
    best.filter(|(_, _, count)| *count > 1)
        .map(|(name, pattern, _)| (name, pattern))
}

/// Number of distinct boilerplate keywords present
fn metadata_hits(text: &str) -> usize {
    METADATA_KEYWORDS
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect::<HashSet<_>>()
        .len()
}

fn hard_split(text: &str, max: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max.max(1))
        .map(|piece| piece.iter().collect())
        .collect()
}

/// Greedy accumulator joining pieces with a separator under a length bound
struct Packer {
    max: usize,
    separator: &'static str,
    current: String,
    current_len: usize,
    done: Vec<String>,
}

impl Packer {
    fn new(max: usize, separator: &'static str) -> Self {
        Self {
            max,
            separator,
            current: String::new(),
            current_len: 0,
            done: Vec::new(),
        }
    }

    fn push(&mut self, piece: &str) {
        let len = char_len(piece);
        let separator_len = char_len(self.separator);
        if self.current_len > 0 && self.current_len + separator_len + len > self.max {
            self.flush();
        }
        if self.current_len > 0 {
            self.current.push_str(self.separator);
            self.current_len += separator_len;
        }
        self.current.push_str(piece);
        self.current_len += len;
    }

    /// Emit pieces that are already bounded, keeping order
    fn extend_whole(&mut self, pieces: Vec<String>) {
        self.flush();
        self.done.extend(pieces);
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.done.push(std::mem::take(&mut self.current));
        }
        self.current_len = 0;
    }

    fn finish(mut self) -> Vec<String> {
        self.flush();
        self.done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTENCE: &str = "Mira walked along the quiet river. ";

    fn paragraph(sentences: usize) -> String {
        SENTENCE.repeat(sentences).trim_end().to_string()
    }

    fn chapter_body(paragraphs: usize) -> String {
        (0..paragraphs)
            .map(|_| paragraph(11))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    #[test]
    fn test_empty_input() {
        assert!(segment("", 3000).is_empty());
        assert!(segment("  \n\n \r\n", 3000).is_empty());
    }

    #[test]
    fn test_three_chapters_of_twelve_thousand_chars() {
        let text = format!(
            "Chapter 1: The River\n\n{}\n\nChapter 2: The Bridge\n\n{}\n\nChapter 3: The Sea\n\n{}",
            chapter_body(6),
            chapter_body(13),
            chapter_body(13)
        );
        assert!(char_len(&text) >= 12_000);

        let chunks = segment(&text, 3000);

        let labels: Vec<&str> = chunks
            .iter()
            .map(|c| c.chapter_label.as_deref().unwrap_or("<none>"))
            .collect();
        let mut distinct = labels.clone();
        distinct.dedup();
        assert_eq!(
            distinct,
            vec!["Chapter 1: The River", "Chapter 2: The Bridge", "Chapter 3: The Sea"]
        );

        // The short chapter stays whole; the long ones are subdivided.
        assert_eq!(labels.iter().filter(|l| l.starts_with("Chapter 1")).count(), 1);
        assert_eq!(labels.iter().filter(|l| l.starts_with("Chapter 2")).count(), 2);
        assert_eq!(labels.iter().filter(|l| l.starts_with("Chapter 3")).count(), 2);
        assert!(chunks.iter().all(|c| c.char_len() <= 3000));
        assert!(chunks.iter().all(|c| !c.text.contains("Chapter")));
    }

    #[test]
    fn test_chinese_chapters() {
        let body = "夜色沉沉，少女提着灯笼走过长长的石桥，河水在桥下缓缓流淌，远处传来几声犬吠，她停下脚步回头望去。月光洒在她的肩头。";
        let text = format!("第一章 初见\n{body}\n第二章 重逢\n{body}\n第十二章 离别\n{body}");

        let chunks = segment(&text, 3000);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chapter_label.as_deref(), Some("第一章 初见"));
        assert_eq!(chunks[2].chapter_label.as_deref(), Some("第十二章 离别"));
        assert_eq!(chunks[0].text, body);
    }

    #[test]
    fn test_single_heading_falls_back_to_paragraphs() {
        let text = format!("Chapter 1\n\n{}", chapter_body(2));
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chapter_label, None);
        assert!(chunks[0].text.starts_with("Chapter 1"));
    }

    #[test]
    fn test_most_matches_wins() {
        let text = format!(
            "# Draft\n\nChapter 1\n\n{p}\n\nChapter 2\n\n{p}\n\nChapter 3\n\n{p}",
            p = paragraph(3)
        );
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chapter_label.as_deref(), Some("Chapter 1"));
    }

    #[test]
    fn test_prologue_before_first_heading_is_unlabelled() {
        let text = format!(
            "{p}\n\nChapter I\n\n{p}\n\nChapter II\n\n{p}",
            p = paragraph(3)
        );
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].chapter_label, None);
        assert_eq!(chunks[1].chapter_label.as_deref(), Some("Chapter I"));
        assert_eq!(chunks[2].chapter_label.as_deref(), Some("Chapter II"));
    }

    #[test]
    fn test_prose_starting_like_a_heading_is_not_split() {
        let text = format!(
            "{p}\n\nPart civil war, part family feud, the quarrel had lasted years.\n\n{p}\n\n\
             Part mild curiosity drove her on toward the harbor gates.\n\n{p}\n\n\
             Chapter mid-morning light found her on the pier.\n\n{p}",
            p = paragraph(3)
        );
        let chunks = segment(&text, 3000);
        assert!(chunks.iter().all(|c| c.chapter_label.is_none()));
    }

    #[test]
    fn test_roman_numeral_headings_with_titles() {
        let text = format!(
            "Part IV: The Sea\n\n{p}\n\nPart V\n\n{p}\n\nPart vi - Home\n\n{p}",
            p = paragraph(3)
        );
        let labels: Vec<_> = segment(&text, 3000)
            .into_iter()
            .map(|c| c.chapter_label)
            .collect();
        assert_eq!(
            labels,
            vec![
                Some("Part IV: The Sea".to_string()),
                Some("Part V".to_string()),
                Some("Part vi - Home".to_string())
            ]
        );
    }

    #[test]
    fn test_chunk_exactly_at_limit_is_kept_whole() {
        let text = "a".repeat(120);
        let chunks = segment(&text, 120);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].char_len(), 120);
    }

    #[test]
    fn test_oversized_paragraph_is_hard_split() {
        let text = "好".repeat(250);
        let chunks = segment(&text, 100);
        let lengths: Vec<usize> = chunks.iter().map(Chunk::char_len).collect();
        // The 50-char tail survives; a shorter one would be dropped.
        assert_eq!(lengths, vec![100, 100, 50]);
    }

    #[test]
    fn test_short_trailing_residue_is_dropped() {
        let text = format!("{}\n\nThe end.", "x".repeat(95));
        let chunks = segment(&text, 100);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "x".repeat(95));
    }

    #[test]
    fn test_boilerplate_lines_are_stripped() {
        let text = format!(
            "https://example.com/book/123\n==========\n{}\n\nRead it for free at our site!\n\n\n\n\n{}",
            paragraph(3),
            paragraph(4)
        );
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, format!("{}\n\n{}", paragraph(3), paragraph(4)));
    }

    #[test]
    fn test_metadata_block_is_dropped() {
        let metadata = "Author: J. Doe\nPublisher: Small Press\nISBN 978-0-00-000000-0\nCopyright 2021, all rights reserved.";
        let text = format!(
            "{metadata}\n\nChapter 1\n\n{p}\n\nChapter 2\n\n{p}",
            p = paragraph(3)
        );
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chapter_label.is_some()));
    }

    #[test]
    fn test_line_endings_normalised() {
        let text = format!("{}\r\n\r\n{}", paragraph(2), paragraph(2));
        let chunks = segment(&text, 3000);
        assert_eq!(chunks.len(), 1);
        assert!(!chunks[0].text.contains('\r'));
    }
}
