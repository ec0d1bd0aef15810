//! The in-memory page model.
//!
//! A [`Workspace`] owns the source registry, the ordered page sequence and the
//! collapsed-group set. Everything else in this module is either a value type
//! held by the workspace or a pure projection over it.

pub mod annotation;
pub mod focus;
pub mod group;
pub mod mix;
pub mod page;
pub mod session;
pub mod shortcut;
pub mod source;
pub mod workspace;

pub use annotation::{Annotation, AnnotationKind, Point};
pub use focus::{Direction, FocusState};
pub use group::{DocumentGroup, group_pages};
pub use mix::{MixOptions, MixPattern};
pub use page::{Page, PageId, RotateDirection, Rotation, Thumbnail};
pub use session::AnnotationSession;
pub use shortcut::{ShortcutAction, apply_shortcut};
pub use source::{SourceDocument, SourceId, SourceRegistry};
pub use workspace::{IngestSummary, SizeEstimate, Workspace};
