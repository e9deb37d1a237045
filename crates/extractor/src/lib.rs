//! # Upgrade Extractor
//!
//! Turns raw per-version release-note text into typed, deduplicated change
//! records.
//!
//! ## Pipeline
//!
//! ```text
//! Changelog document
//!     │
//!     ├──> Section splitter (version headings)
//!     │      └─> (version identifier, section text)
//!     │
//!     └──> Extractor (per section, pure)
//!            ├─ Skip blank and heading lines
//!            ├─ Category table, first match by priority
//!            │    Breaking > Security > Removal > Deprecation > Feature
//!            ├─ Other for bullets under "notable change" headings
//!            ├─ Component heuristic (code spans, group/version, CamelCase)
//!            └─ Deduplicate by normalized line hash
//! ```
//!
//! ## Example
//!
//! ```
//! use upgrade_extractor::{extract, ChangeType, VersionId};
//!
//! let version = VersionId::parse("1.21.0").unwrap();
//! let changes = extract(&version, "CronJob batch/v1beta1 API is deprecated, use batch/v1");
//!
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].change_type, ChangeType::Deprecation);
//! assert_eq!(changes[0].component.as_deref(), Some("batch/v1beta1"));
//! ```

mod change;
mod component;
mod error;
mod extractor;
mod normalize;
mod patterns;
mod sections;
mod version;

pub use change::{Change, ChangeType};
pub use component::extract_component;
pub use error::{ExtractError, Result};
pub use extractor::extract;
pub use normalize::{line_hash, normalize_line};
pub use patterns::{classify_line, is_notable_heading, matching_types};
pub use sections::{split_sections, VersionSection, DEFAULT_MIN_SECTION_CHARS};
pub use version::VersionId;
