//! Configuration constants shared by the task functions.

use std::time::Duration;

/// Extension appended to font output names that lack one.
pub const FONT_EXTENSION: &str = "ttf";

/// Number of undo (and redo) steps kept by the backup history.
pub const HISTORY_LIMIT: usize = 20;

/// Directory under the system temp dir holding history backups.
pub const HISTORY_DIR_NAME: &str = "galfont_history";

/// Family name written by the disguise step when none is given.
pub const DEFAULT_FAMILY_NAME: &str = "My Game Font";

/// Suffix appended to name ids 1 and 4 by the width tweak.
pub const CONDENSED_SUFFIX: &str = " Condensed";

/// Advance offsets below this are unlikely to be visible at 1000 to 2048 UPM.
pub const MIN_VISIBLE_SPACING: i32 = 10;

/// Charset cache bounds for the fallback scan.
pub const CHARSET_CACHE_CAPACITY: usize = 10;
pub const CHARSET_CACHE_MAX_AGE: Duration = Duration::from_secs(300);

/// Atlas defaults.
pub const DEFAULT_TEXTURE_SIZE: u32 = 1024;
pub const DEFAULT_ATLAS_FONT_SIZE: u32 = 32;

/// Legacy grid atlas defaults.
pub const DEFAULT_LEGACY_IMAGE_SIZE: (u32, u32) = (2048, 2048);
pub const DEFAULT_LEGACY_FONT_SIZE: u32 = 24;
pub const DEFAULT_LEGACY_SPACING: u32 = 2;
pub const LEGACY_OUTPUT_DIR: &str = "new";
