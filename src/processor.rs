use subedit::{Frame, Sequence, Subtitle, FPS};

use anyhow::{Context, Result};
use regex::Regex;

/// Longest leader subtitle, in frames.
const LEADER_MAX: Frame = 5 * FPS;

pub struct ProcessOpts {
    pub leader_text: Option<String>,
    pub drop_patterns: Option<String>,
}

pub fn process(seq: &mut Sequence, opts: ProcessOpts) -> Result<()> {
    if let Some(path) = opts.drop_patterns {
        let regexes = load_regex(&path)?;
        let dropped = strip_ads(seq, &regexes)?;
        tracing::info!("Dropped {} subtitles", dropped);
    }
    if let Some(text) = opts.leader_text {
        insert_leader(seq, text)?;
    }
    Ok(())
}

fn insert_leader(seq: &mut Sequence, text: String) -> Result<()> {
    let end = match seq.iter().next() {
        Some(first) => first.start.min(LEADER_MAX),
        None => return Ok(()),
    };
    if end > 0 {
        seq.add_subtitle(0, end, text)
            .context("Failed to insert the leader subtitle")?;
    }
    Ok(())
}

/// Clears every subtitle matching one of `regexes`, returning how many were
/// cleared.
fn strip_ads(seq: &mut Sequence, regexes: &[Regex]) -> Result<usize> {
    struct Marker {
        start: Frame,
        text: String,
        is_ad: bool,
    }
    fn is_subset(later: &Marker, cur: &Marker) -> bool {
        // An advert revealed word by word shows up as a run of subtitles,
        // each a prefix of the next one and at most two characters shorter.
        later.text.starts_with(&cur.text) && later.text.len().saturating_sub(cur.text.len()) <= 2
    }

    let mut markers: Vec<Marker> = seq
        .iter()
        .map(|sub| Marker {
            start: sub.start,
            text: sub.text.clone(),
            is_ad: regexes.iter().any(|r| is_match(r, sub)),
        })
        .collect();

    let mut later_ad: Option<usize> = None;
    for index in (0..markers.len()).rev() {
        later_ad = if markers[index].is_ad {
            Some(index)
        } else if let Some(later) = later_ad.filter(|&l| is_subset(&markers[l], &markers[index])) {
            tracing::info!(
                "Matched subset (base: '{}', sub: '{}')",
                markers[later].text,
                markers[index].text
            );
            markers[index].is_ad = true;
            Some(index)
        } else {
            None
        };
    }

    let ads: Vec<Frame> = markers
        .iter()
        .filter(|m| m.is_ad)
        .map(|m| m.start)
        .collect();
    for &start in &ads {
        seq.change_subtitle_text_at_time_to(start, "")
            .with_context(|| format!("Failed to drop the subtitle at frame {}", start))?;
    }
    Ok(ads.len())
}

fn is_match(regex: &Regex, subtitle: &Subtitle) -> bool {
    subtitle.display_lines().any(|line| {
        let mtch = regex.is_match(line);
        if mtch {
            tracing::info!("Matched \"{}\" against /{}/", line, regex);
        }
        mtch
    })
}

fn load_regex(path: &str) -> Result<Vec<Regex>> {
    let patterns = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read regex file: '{}'", path))?;
    let patterns: Vec<&str> = patterns
        .lines()
        .map(|p| p.trim_start())
        .filter(|p| !p.is_empty() && !p.starts_with('#'))
        .collect();
    tracing::debug!("Drop patterns: {:#?}", patterns);
    patterns
        .into_iter()
        .map(|p| Regex::new(p).with_context(|| format!("Invalid regex: '{}'", p)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sequence(subs: &[(Frame, Frame, &str)]) -> Sequence {
        let mut seq = Sequence::new();
        for &(start, end, text) in subs {
            seq.add_subtitle(start, end, text).unwrap();
        }
        seq.clear_undo_stack();
        seq
    }

    fn texts(seq: &Sequence) -> Vec<String> {
        seq.iter()
            .filter(|sub| sub.has_text())
            .map(|sub| sub.text.clone())
            .collect()
    }

    #[test]
    fn strips_matching_subtitles_and_their_reveal() {
        let mut seq = sequence(&[
            (0, 50, "Hello"),
            (50, 100, "Subtitles by"),
            (100, 150, "Subtitles by X"),
            (150, 200, "Subtitles by XYZ corp"),
            (200, 250, "Goodbye"),
        ]);
        let regexes = vec![Regex::new("XYZ corp").unwrap()];

        let dropped = strip_ads(&mut seq, &regexes).unwrap();

        assert_eq!(dropped, 1);
        assert_eq!(texts(&seq), vec!["Hello", "Subtitles by", "Subtitles by X", "Goodbye"]);
    }

    #[test]
    fn strips_progressive_reveals() {
        let mut seq = sequence(&[
            (0, 50, "Hello"),
            (50, 100, "Visit ab"),
            (100, 150, "Visit abc"),
            (150, 200, "Visit abcd"),
            (200, 250, "Goodbye"),
        ]);
        let regexes = vec![Regex::new("abcd").unwrap()];

        let dropped = strip_ads(&mut seq, &regexes).unwrap();

        assert_eq!(dropped, 3);
        assert_eq!(texts(&seq), vec!["Hello", "Goodbye"]);
        assert_eq!(seq.subtitle_at(0).unwrap().end, 50);
    }

    #[test]
    fn matches_any_display_line() {
        let sub = Subtitle::new(0, 10, "First\\nwww.example.com");

        assert!(is_match(&Regex::new(r"^www\.").unwrap(), &sub));
        assert!(!is_match(&Regex::new(r"^First$").unwrap(), &Subtitle::new(0, 10, "First line")));
    }

    #[test]
    fn inserts_a_leader_of_at_most_five_seconds() {
        let mut seq = sequence(&[(400, 450, "Late start")]);
        insert_leader(&mut seq, "Subtitles loaded.".to_string()).unwrap();

        let leader = seq.subtitle_at(0).unwrap();
        assert_eq!((leader.start, leader.end), (0, LEADER_MAX));
        assert_eq!(leader.text, "Subtitles loaded.");
    }

    #[test]
    fn leader_fills_a_short_lead_in() {
        let mut seq = sequence(&[(30, 80, "Early start")]);
        insert_leader(&mut seq, "Subtitles loaded.".to_string()).unwrap();

        assert_eq!(seq.subtitle_at(0).unwrap().end, 30);
        assert_eq!(seq.len(), 2);
    }

    #[test]
    fn no_leader_when_subtitles_start_immediately() {
        let mut seq = sequence(&[(0, 80, "Immediate")]);
        insert_leader(&mut seq, "Subtitles loaded.".to_string()).unwrap();

        assert_eq!(seq.len(), 1);
        assert_eq!(seq.subtitle_at(0).unwrap().text, "Immediate");
    }
}
