//! Batched, concurrent document indexing.
//!
//! The upload path partitions a chunk sequence into contiguous fixed-size
//! batches (the last may be short) and submits every batch to the vector
//! store at once, one task per batch, with no admission control and no
//! ordering between submissions. The failure unit is the batch: an error is
//! caught, logged with the batch's ordinal and size, and counted; it never
//! aborts sibling uploads, and nothing is retried or rolled back. The caller
//! blocks until every batch has resolved, then receives the aggregate
//! [`IndexSummary`].

use std::sync::Arc;

use tokio::task::JoinSet;

use crate::console::Console;
use crate::models::{Document, IndexSummary};
use crate::vector_store::VectorStore;

/// Partition `documents` into contiguous batches of `batch_size`.
///
/// The last batch may be smaller; zero documents yield zero batches.
/// A `batch_size` of zero is treated as one, so no input is ever dropped.
/// Concatenating the batches in order reconstructs the input exactly.
pub fn partition(documents: Vec<Document>, batch_size: usize) -> Vec<Vec<Document>> {
    let batch_size = batch_size.max(1);

    let mut batches = Vec::with_capacity(documents.len().div_ceil(batch_size));
    let mut iter = documents.into_iter();
    loop {
        let batch: Vec<Document> = iter.by_ref().take(batch_size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

/// Upload `documents` to the store in concurrent batches and report the
/// aggregate outcome.
///
/// Zero documents is a no-op success. Successful batches durably mutate the
/// store; failed batches leave no trace there and are not retried.
pub async fn index_documents(
    store: Arc<dyn VectorStore>,
    documents: Vec<Document>,
    batch_size: usize,
    console: Console,
) -> IndexSummary {
    console.info(&format!(
        "indexing {} documents into '{}'",
        documents.len(),
        store.name()
    ));

    let batches = partition(documents, batch_size);
    let total = batches.len();
    console.info(&format!(
        "processing {} batches of size {}",
        total, batch_size
    ));

    let mut tasks = JoinSet::new();
    for (position, batch) in batches.into_iter().enumerate() {
        let store = Arc::clone(&store);
        tasks.spawn(async move {
            let ordinal = position + 1;
            let size = batch.len();
            match store.add_documents(&batch).await {
                Ok(()) => {
                    console.success(&format!(
                        "indexed batch {}/{} ({} documents)",
                        ordinal, total, size
                    ));
                    true
                }
                Err(error) => {
                    console.error(&format!(
                        "failed to index batch {}/{} ({} documents): {:#}",
                        ordinal, total, size, error
                    ));
                    false
                }
            }
        });
    }

    let mut succeeded = 0;
    while let Some(outcome) = tasks.join_next().await {
        if matches!(outcome, Ok(true)) {
            succeeded += 1;
        }
    }

    let summary = IndexSummary { total, succeeded };
    if summary.is_complete() {
        console.success(&format!(
            "all batches indexed successfully ({}/{})",
            summary.succeeded, summary.total
        ));
    } else {
        console.warning(&format!(
            "some batches failed to index ({}/{})",
            summary.succeeded, summary.total
        ));
    }
    summary
}
