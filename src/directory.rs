use crate::store::ScheduleStore;

/// The closed roster of bookable clinicians. Names come from the store's
/// partition table, seeded once at startup; order is stable for the process
/// lifetime.
#[derive(Clone)]
pub struct ProviderDirectory {
    store: ScheduleStore,
}

impl ProviderDirectory {
    pub fn new(store: ScheduleStore) -> Self {
        Self { store }
    }

    pub fn list(&self) -> anyhow::Result<Vec<String>> {
        self.store.list_providers()
    }

    pub fn exists(&self, name: &str) -> anyhow::Result<bool> {
        self.store.provider_exists(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_directory() -> ProviderDirectory {
        let store = ScheduleStore::open(":memory:").unwrap();
        store
            .bootstrap(&[
                "Dr. Jesan Ahmed".to_string(),
                "Dr. Hasan Rahman".to_string(),
                "Dr. Gregory House".to_string(),
            ])
            .unwrap();
        ProviderDirectory::new(store)
    }

    #[test]
    fn test_list_preserves_seed_order() {
        let directory = test_directory();
        assert_eq!(
            directory.list().unwrap(),
            vec!["Dr. Jesan Ahmed", "Dr. Hasan Rahman", "Dr. Gregory House"]
        );
    }

    #[test]
    fn test_exists() {
        let directory = test_directory();
        assert!(directory.exists("Dr. Gregory House").unwrap());
        assert!(!directory.exists("Dr. Gregory").unwrap());
    }
}
