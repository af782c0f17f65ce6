//! Bounded-batch decryption.
//!
//! Items are decrypted at most `batch_size` at a time so a large vault never
//! holds every plaintext summary at once, and so one failing batch only costs
//! that batch.
//!
//! # Example
//!
//! ```ignore
//! let mut batches = BatchDecryptor::new(&capabilities, &ciphers, 100);
//! while let Some(batch) = batches.next_batch().await {
//!     for item in batch {
//!         // filter and accumulate
//!     }
//! }
//! ```

use std::borrow::Cow;

use tracing::{debug, trace, warn};

use crate::capability::{Capabilities, ErrorReporter, VaultDecryption, VaultListError};
use crate::model::{EncryptedItem, ItemSummary};

type PreFilter<'a> = Box<dyn Fn(&EncryptedItem) -> bool + Send + Sync + 'a>;

/// Decrypts a slice of encrypted items batch by batch.
pub struct BatchDecryptor<'a> {
    decryption: &'a dyn VaultDecryption,
    error_reporter: &'a dyn ErrorReporter,
    items: &'a [EncryptedItem],
    batch_size: usize,
    pre_filter: Option<PreFilter<'a>>,
    position: usize,
    batch_index: usize,
}

impl<'a> BatchDecryptor<'a> {
    /// A `batch_size` of 0 is treated as 1.
    pub fn new(capabilities: &'a Capabilities, items: &'a [EncryptedItem], batch_size: usize) -> Self {
        Self {
            decryption: capabilities.decryption.as_ref(),
            error_reporter: capabilities.error_reporter.as_ref(),
            items,
            batch_size: batch_size.max(1),
            pre_filter: None,
            position: 0,
            batch_index: 0,
        }
    }

    /// Skip items whose plaintext metadata fails `filter` before they are
    /// decrypted. Skipped items don't count towards the batch size.
    #[must_use]
    pub fn with_pre_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&EncryptedItem) -> bool + Send + Sync + 'a,
    {
        self.pre_filter = Some(Box::new(filter));
        self
    }

    /// Decrypt and return the next batch, in input order.
    ///
    /// A batch whose decrypt call fails is reported and skipped; `None` means
    /// the input is exhausted.
    pub async fn next_batch(&mut self) -> Option<Vec<ItemSummary>> {
        loop {
            let batch = self.take_batch()?;
            let batch_index = self.batch_index;
            self.batch_index += 1;

            match self.decryption.decrypt_batch(&batch).await {
                Ok(decrypted) => {
                    trace!(batch_index, item_count = decrypted.len(), "Decrypted batch");
                    return Some(decrypted);
                }
                Err(source) => {
                    warn!(batch_index, item_count = batch.len(), error = %source, "Skipping batch that failed to decrypt");
                    self.error_reporter.log(&VaultListError::BatchDecryption {
                        batch_index,
                        item_count: batch.len(),
                        source,
                    });
                }
            }
        }
    }

    /// Consume the decryptor as a stream of batches.
    #[cfg(feature = "async")]
    pub fn into_stream(self) -> impl futures::Stream<Item = Vec<ItemSummary>> + Send + 'a {
        futures::stream::unfold(self, |mut decryptor| async move {
            let batch = decryptor.next_batch().await?;
            Some((batch, decryptor))
        })
    }

    fn take_batch(&mut self) -> Option<Cow<'a, [EncryptedItem]>> {
        let items = self.items;
        let Some(filter) = self.pre_filter.as_ref() else {
            if self.position >= items.len() {
                return None;
            }
            let end = (self.position + self.batch_size).min(items.len());
            let batch = &items[self.position..end];
            self.position = end;
            return Some(Cow::Borrowed(batch));
        };

        let mut batch = Vec::with_capacity(self.batch_size);
        while self.position < items.len() && batch.len() < self.batch_size {
            let item = &items[self.position];
            self.position += 1;
            if filter(item) {
                batch.push(item.clone());
            }
        }
        if batch.is_empty() {
            debug!(position = self.position, "No items left after pre-filter");
            return None;
        }
        Some(Cow::Owned(batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestVault, encrypted_item, login_summary};

    fn encrypted(count: usize) -> Vec<EncryptedItem> {
        (0..count)
            .map(|i| encrypted_item(&login_summary(&format!("id-{i}"), &format!("Item {i}"))))
            .collect()
    }

    #[tokio::test]
    async fn test_batches_respect_batch_size() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let items = encrypted(250);

        let mut decryptor = BatchDecryptor::new(&capabilities, &items, 100);
        let mut sizes = Vec::new();
        while let Some(batch) = decryptor.next_batch().await {
            sizes.push(batch.len());
        }

        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(vault.decryption.batch_sizes(), vec![100, 100, 50]);
    }

    #[tokio::test]
    async fn test_failed_batch_is_skipped_and_reported() {
        let vault = TestVault::new();
        vault.decryption.fail_batch(1);
        let capabilities = vault.capabilities();
        let items = encrypted(30);

        let mut decryptor = BatchDecryptor::new(&capabilities, &items, 10);
        let mut ids = Vec::new();
        while let Some(batch) = decryptor.next_batch().await {
            ids.extend(batch.into_iter().filter_map(|item| item.id));
        }

        assert_eq!(ids.len(), 20);
        assert_eq!(ids.first().map(String::as_str), Some("id-0"));
        assert_eq!(ids.get(10).map(String::as_str), Some("id-20"));

        let reported = vault.errors.errors();
        assert_eq!(reported.len(), 1);
        assert!(matches!(
            reported[0],
            VaultListError::BatchDecryption {
                batch_index: 1,
                item_count: 10,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_pre_filter_skips_before_decryption() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let items = encrypted(10);

        let mut decryptor = BatchDecryptor::new(&capabilities, &items, 3)
            .with_pre_filter(|item| item.id.as_deref().is_some_and(|id| id.ends_with(['0', '5'])));
        let mut ids = Vec::new();
        while let Some(batch) = decryptor.next_batch().await {
            ids.extend(batch.into_iter().filter_map(|item| item.id));
        }

        assert_eq!(ids, vec!["id-0", "id-5"]);
        assert_eq!(vault.decryption.batch_sizes(), vec![2]);
    }

    #[tokio::test]
    async fn test_empty_input_yields_nothing() {
        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let mut decryptor = BatchDecryptor::new(&capabilities, &[], 100);
        assert!(decryptor.next_batch().await.is_none());
        assert!(vault.decryption.batch_sizes().is_empty());
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_into_stream_yields_every_batch() {
        use futures::StreamExt;

        let vault = TestVault::new();
        let capabilities = vault.capabilities();
        let items = encrypted(5);

        let batches: Vec<Vec<ItemSummary>> = BatchDecryptor::new(&capabilities, &items, 2)
            .into_stream()
            .collect()
            .await;
        assert_eq!(batches.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 1]);
    }
}
