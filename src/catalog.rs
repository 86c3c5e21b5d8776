//! Function catalog — the static scene / category / function tables.
//!
//! Pure data: nothing here holds mutable state.  The engine consults the
//! catalog to label log entries and to decide whether a selected function
//! is transmitted once or repeated on a fixed interval.
//!
//! ```text
//!  Category      idx 0        idx 1          idx 2
//!  ──────────    ─────────    ───────────    ──────────
//!  Display       启动发动机    油门控制 ⟳1500  刹车控制
//!  Sound         开启车灯      解锁车门        调节座椅 ⟳2000
//!  Inspection    激活ABS       气囊检测 ⟳3000  胎压监测
//! ```

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════
//  Scenes
// ═══════════════════════════════════════════════════════════════

/// Vehicle operating scene (ignition state) selectable in Auto mode.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scene {
    B,
    BA,
    IGP,
    IGR,
    ST,
    ACC,
}

impl Scene {
    /// Every scene, in panel button order.
    pub const ALL: [Scene; 6] = [
        Scene::B,
        Scene::BA,
        Scene::IGP,
        Scene::IGR,
        Scene::ST,
        Scene::ACC,
    ];

    /// Short identifier shown on the scene button and written to the log.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::BA => "BA",
            Self::IGP => "IGP",
            Self::IGR => "IGR",
            Self::ST => "ST",
            Self::ACC => "ACC",
        }
    }
}

impl FromStr for Scene {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|scene| scene.as_str() == s.trim())
            .ok_or(Error::OutOfRange)
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Categories
// ═══════════════════════════════════════════════════════════════

/// Top-level signal classification in Auto mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Category {
    Display = 0,
    Sound = 1,
    Inspection = 2,
}

impl Category {
    /// Total number of categories.
    pub const COUNT: usize = 3;

    pub const ALL: [Category; Self::COUNT] =
        [Category::Display, Category::Sound, Category::Inspection];

    /// Convert a dropdown index back to a `Category`.
    pub fn from_index(idx: usize) -> Result<Self> {
        Self::ALL.get(idx).copied().ok_or(Error::OutOfRange)
    }

    /// Bilingual label used in the dropdown and in TX log entries.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Display => "显示 (Display)",
            Self::Sound => "声音 (Sound)",
            Self::Inspection => "检查 (Inspection)",
        }
    }

    const fn functions(self) -> &'static [&'static str] {
        match self {
            Self::Display => &DISPLAY_FUNCTIONS,
            Self::Sound => &SOUND_FUNCTIONS,
            Self::Inspection => &INSPECTION_FUNCTIONS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ═══════════════════════════════════════════════════════════════
//  Function tables
// ═══════════════════════════════════════════════════════════════

const DISPLAY_FUNCTIONS: [&str; 3] = ["启动发动机", "油门控制", "刹车控制"];
const SOUND_FUNCTIONS: [&str; 3] = ["开启车灯", "解锁车门", "调节座椅"];
const INSPECTION_FUNCTIONS: [&str; 3] = ["激活ABS", "气囊检测", "胎压监测"];

/// One row of the repeating-function table.
struct RepeatingFunction {
    category: Category,
    function: usize,
    interval_ms: u32,
}

/// Functions that retransmit periodically; everything else is one-shot.
const REPEATING_FUNCTIONS: [RepeatingFunction; 3] = [
    RepeatingFunction {
        category: Category::Sound,
        function: 2,
        interval_ms: 2000,
    },
    RepeatingFunction {
        category: Category::Inspection,
        function: 1,
        interval_ms: 3000,
    },
    RepeatingFunction {
        category: Category::Display,
        function: 1,
        interval_ms: 1500,
    },
];

/// Name of function `index` within `category`.
///
/// Returns `Err(OutOfRange)` if `index >= function_count(category)`.
pub fn function_name(category: Category, index: usize) -> Result<&'static str> {
    category
        .functions()
        .get(index)
        .copied()
        .ok_or(Error::OutOfRange)
}

/// Number of functions offered for `category`.
pub fn function_count(category: Category) -> usize {
    category.functions().len()
}

/// Repeat interval for a catalog function, or `None` for one-shot functions.
pub fn repeat_interval(category: Category, index: usize) -> Option<u32> {
    REPEATING_FUNCTIONS
        .iter()
        .find(|r| r.category == category && r.function == index)
        .map(|r| r.interval_ms)
}
