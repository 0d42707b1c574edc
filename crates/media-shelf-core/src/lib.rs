pub mod error;
pub mod fields;
pub mod filter;
pub mod library;
pub mod metrics;
pub mod recommend;
pub mod sort;
pub mod state;

pub use error::{MetricsError, RecordFault, SkippedRecord};
pub use filter::{apply_filters, FilterOutcome, FilterSpec, GenreOperator};
pub use library::{load_records, Frontmatter, LoadReport};
pub use metrics::{compute_metrics, Dimension, DimensionEntry, LibraryMetrics, MetricsQuery, RankingMode};
pub use recommend::{rank_recommendations, seed_pool, toggle_seed};
pub use sort::{filter_and_sort, SortDirection, SortKey, SortSpec};
pub use state::{LibraryView, ViewEvent, ViewState};
