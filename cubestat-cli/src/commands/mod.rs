pub(crate) mod lookup;
pub(crate) mod nemesis;
pub(crate) mod pk;
pub(crate) mod refresh;
pub(crate) mod serve;
pub(crate) mod status;
pub(crate) mod upcoming;

use cubestat_lib::QueryError;

use crate::render;

/// Explain a failed person lookup, listing candidates when ambiguous.
pub(crate) fn report_query_error(err: &QueryError) {
    match err {
        QueryError::Ambiguous { query, candidates } => {
            log::warn!("'{query}' matches {} people:", candidates.len());
            for p in candidates {
                log::warn!("  {}", render::person(p));
            }
            log::warn!("Use a WCA id to pick one.");
        }
        QueryError::NoStore => {
            log::warn!("No results store yet. Run 'cubestat refresh' first.");
        }
        other => log::error!("{other}"),
    }
}
