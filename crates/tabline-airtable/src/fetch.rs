//! Pagination loop

use indicatif::ProgressBar;
use tabline_core::FetchError;

use crate::api::{PageSource, TableQuery};
use crate::record::Record;

/// Fetch every record of a table, following continuation tokens until a
/// page arrives without one.
///
/// There is no page limit; termination depends on the source eventually
/// omitting the token. The first failing page aborts the loop and the
/// records gathered so far are dropped.
pub fn fetch_all(
    source: &impl PageSource,
    query: &TableQuery,
    pb: &ProgressBar,
) -> Result<Vec<Record>, FetchError> {
    let mut records = Vec::new();
    let mut offset: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let (batch, next) = source.fetch_page(query, offset.as_deref())?.into_parts();
        pages += 1;
        log::debug!(
            "{}/{}: page {pages} with {} records",
            query.base_id,
            query.table_id,
            batch.len()
        );
        records.extend(batch);
        pb.set_message(format!("page {pages}, {} records", records.len()));

        match next {
            Some(token) => offset = Some(token),
            None => break,
        }
    }

    Ok(records)
}
