use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::consts::{MAX_RECENT, RECENT_CATEGORY};

/// Position of a candidate inside its index. Stable for the index's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CandidateId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkinTone {
    #[default]
    None,
    Light,
    MediumLight,
    Medium,
    MediumDark,
    Dark,
}

impl SkinTone {
    /// Fitzpatrick modifier codepoint for this tone.
    pub fn modifier(self) -> Option<u32> {
        match self {
            SkinTone::None => None,
            SkinTone::Light => Some(0x1F3FB),
            SkinTone::MediumLight => Some(0x1F3FC),
            SkinTone::Medium => Some(0x1F3FD),
            SkinTone::MediumDark => Some(0x1F3FE),
            SkinTone::Dark => Some(0x1F3FF),
        }
    }
}

const VARIATION_SELECTOR_16: u32 = 0xFE0F;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,
    /// Display text; doubles as the stable key.
    pub text: String,
    pub name: String,
    pub keywords: Vec<String>,
    pub codepoints: Vec<u32>,
    pub skin_tones: bool,
}

impl Candidate {
    pub fn supports_skin_tone(&self) -> bool {
        self.skin_tones
    }

    /// Codepoints of the variant for `tone`, or the base sequence when the
    /// tone is unset or unsupported.
    pub fn codepoints_with(&self, tone: SkinTone) -> Vec<u32> {
        let modifier = match tone.modifier() {
            Some(m) if self.skin_tones => m,
            _ => return self.codepoints.clone(),
        };
        let mut out = Vec::with_capacity(self.codepoints.len() + 1);
        let mut it = self.codepoints.iter().copied();
        if let Some(first) = it.next() {
            out.push(first);
            out.push(modifier);
        }
        let mut rest = it.peekable();
        if rest.peek() == Some(&VARIATION_SELECTOR_16) {
            rest.next();
        }
        out.extend(rest);
        out
    }

    pub fn text_with(&self, tone: SkinTone) -> String {
        if tone == SkinTone::None || !self.skin_tones {
            return self.text.clone();
        }
        self.codepoints_with(tone)
            .into_iter()
            .filter_map(char::from_u32)
            .collect()
    }

    fn matches_word(&self, word: &str) -> bool {
        self.name.contains(word) || self.keywords.iter().any(|k| k.contains(word))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    /// Display order.
    pub members: Vec<CandidateId>,
}

/// Read-only query surface over an emoji dataset.
pub trait CandidateIndex {
    fn categories(&self) -> &[Category];

    /// Matches for `needle`, optionally restricted to categories whose name
    /// contains `category`. Order is the provider's; callers keep it.
    fn find(&self, category: Option<&str>, needle: &str) -> Vec<CandidateId>;

    fn candidate(&self, id: CandidateId) -> Option<&Candidate>;

    /// Hook invoked after a candidate has been accepted.
    fn record_use(&mut self, _id: CandidateId) {}
}

#[derive(Debug, Deserialize)]
struct RawDb {
    categories: Vec<RawCategory>,
}

#[derive(Debug, Deserialize)]
struct RawCategory {
    name: String,
    emojis: Vec<RawEmoji>,
}

#[derive(Debug, Deserialize)]
struct RawEmoji {
    emoji: String,
    name: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    skin_tones: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RecentFile {
    emojis: Vec<String>,
}

/// JSON-backed [`CandidateIndex`] with a most-recently-used category.
#[derive(Debug, Default)]
pub struct EmojiDb {
    candidates: Vec<Candidate>,
    by_text: HashMap<String, CandidateId>,
    base: Vec<Category>,
    recent: Vec<CandidateId>,
    // `Recent` (when non-empty) followed by `base`.
    view: Vec<Category>,
    recent_path: Option<PathBuf>,
}

impl EmojiDb {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read emoji data {}", path.display()))?;
        Self::from_json_str(&s).with_context(|| format!("parse emoji data {}", path.display()))
    }

    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let raw: RawDb = serde_json::from_str(s).context("decode json")?;
        let mut db = EmojiDb::default();
        for rc in raw.categories {
            let mut members = Vec::with_capacity(rc.emojis.len());
            for re in rc.emojis {
                let id = match db.by_text.get(&re.emoji) {
                    Some(id) => *id,
                    None => {
                        let id = CandidateId(db.candidates.len());
                        db.candidates.push(Candidate {
                            id,
                            codepoints: re.emoji.chars().map(u32::from).collect(),
                            text: re.emoji.clone(),
                            name: re.name,
                            keywords: re.keywords,
                            skin_tones: re.skin_tones,
                        });
                        db.by_text.insert(re.emoji, id);
                        id
                    }
                };
                if !members.contains(&id) {
                    members.push(id);
                }
            }
            db.base.push(Category {
                name: rc.name,
                members,
            });
        }
        db.rebuild_view();
        log::debug!(
            "catalog: loaded candidates={} categories={}",
            db.candidates.len(),
            db.base.len()
        );
        Ok(db)
    }

    /// Attach a recent-list file: loads it now and rewrites it on every use.
    ///
    /// A missing or unreadable file just means an empty list.
    pub fn with_recent_store(mut self, path: PathBuf) -> Self {
        if let Ok(s) = std::fs::read_to_string(&path) {
            match serde_json::from_str::<RecentFile>(&s) {
                Ok(f) => {
                    self.recent = f
                        .emojis
                        .iter()
                        .filter_map(|t| self.by_text.get(t).copied())
                        .take(MAX_RECENT)
                        .collect();
                }
                Err(e) => log::warn!("catalog: ignoring recent list {}: {e}", path.display()),
            }
        }
        self.recent_path = Some(path);
        self.rebuild_view();
        self
    }

    pub fn recent(&self) -> &[CandidateId] {
        &self.recent
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    fn rebuild_view(&mut self) {
        self.view.clear();
        if !self.recent.is_empty() {
            self.view.push(Category {
                name: RECENT_CATEGORY.to_string(),
                members: self.recent.clone(),
            });
        }
        self.view.extend(self.base.iter().cloned());
    }

    fn persist_recent(&self) {
        // Best-effort; never fail the main flow.
        let Some(p) = self.recent_path.as_ref() else {
            return;
        };
        let file = RecentFile {
            emojis: self
                .recent
                .iter()
                .map(|id| self.candidates[id.0].text.clone())
                .collect(),
        };
        let body = match serde_json::to_string(&file) {
            Ok(s) => s,
            Err(_) => return,
        };
        if let Some(parent) = p.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Err(e) = std::fs::write(p, body) {
            log::debug!("catalog: write recent {} failed: {e}", p.display());
        }
    }
}

impl CandidateIndex for EmojiDb {
    fn categories(&self) -> &[Category] {
        &self.view
    }

    fn find(&self, category: Option<&str>, needle: &str) -> Vec<CandidateId> {
        let words: Vec<&str> = needle.split_whitespace().collect();
        let mut seen = vec![false; self.candidates.len()];
        let mut out = Vec::new();
        for cat in &self.view {
            if let Some(filter) = category {
                if !cat.name.contains(filter) {
                    continue;
                }
            }
            for id in &cat.members {
                if seen[id.0] {
                    continue;
                }
                let c = &self.candidates[id.0];
                if words.iter().all(|w| c.matches_word(w)) {
                    seen[id.0] = true;
                    out.push(*id);
                }
            }
        }
        out
    }

    fn candidate(&self, id: CandidateId) -> Option<&Candidate> {
        self.candidates.get(id.0)
    }

    fn record_use(&mut self, id: CandidateId) {
        if id.0 >= self.candidates.len() {
            return;
        }
        self.recent.retain(|r| *r != id);
        self.recent.insert(0, id);
        self.recent.truncate(MAX_RECENT);
        self.rebuild_view();
        self.persist_recent();
    }
}
