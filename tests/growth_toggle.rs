#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use tameny::growth::{
        milestone_key, GrowthError, GrowthStore, GrowthTracker, MilestoneCategory, ToggleOutcome,
        MILESTONES, VACCINATION_SCHEDULE,
    };
    use tameny::remote::RemoteError;
    use tameny::schema::{
        MilestoneRecord, NewMilestoneRecord, NewVaccinationRecord, VaccinationRecord,
    };
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeGrowthStore {
        vaccinations: Mutex<Vec<VaccinationRecord>>,
        milestones: Mutex<Vec<MilestoneRecord>>,
        fail_writes: Mutex<bool>,
    }

    impl FakeGrowthStore {
        fn failing(&self) -> Result<(), RemoteError> {
            if *self.fail_writes.lock().unwrap() {
                Err(RemoteError::Network("connection reset".into()))
            } else {
                Ok(())
            }
        }

        fn vaccine_names(&self, child: Uuid) -> Vec<String> {
            self.vaccinations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.child_id == child)
                .map(|r| r.vaccine_name.clone())
                .collect()
        }
    }

    #[async_trait]
    impl GrowthStore for FakeGrowthStore {
        async fn vaccinations_for(
            &self,
            child: Uuid,
        ) -> Result<Vec<VaccinationRecord>, RemoteError> {
            Ok(self
                .vaccinations
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.child_id == child)
                .cloned()
                .collect())
        }

        async fn add_vaccination(&self, record: &NewVaccinationRecord) -> Result<(), RemoteError> {
            self.failing()?;
            self.vaccinations.lock().unwrap().push(VaccinationRecord {
                id: Uuid::new_v4(),
                child_id: record.child_id,
                vaccine_name: record.vaccine_name.clone(),
                completed: record.completed,
                completed_at: Some(record.completed_at),
            });
            Ok(())
        }

        async fn remove_vaccination(
            &self,
            child: Uuid,
            vaccine_name: &str,
        ) -> Result<(), RemoteError> {
            self.failing()?;
            self.vaccinations
                .lock()
                .unwrap()
                .retain(|r| !(r.child_id == child && r.vaccine_name == vaccine_name));
            Ok(())
        }

        async fn milestones_for(&self, child: Uuid) -> Result<Vec<MilestoneRecord>, RemoteError> {
            Ok(self
                .milestones
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.child_id == child)
                .cloned()
                .collect())
        }

        async fn add_milestone(&self, record: &NewMilestoneRecord) -> Result<(), RemoteError> {
            self.failing()?;
            self.milestones.lock().unwrap().push(MilestoneRecord {
                id: Uuid::new_v4(),
                child_id: record.child_id,
                milestone_id: record.milestone_id.clone(),
                category: record.category.clone(),
                age_range: record.age_range.clone(),
                description: record.description.clone(),
                achieved_at: Some(record.achieved_at),
            });
            Ok(())
        }

        async fn remove_milestone(
            &self,
            child: Uuid,
            milestone_id: &str,
        ) -> Result<(), RemoteError> {
            self.failing()?;
            self.milestones
                .lock()
                .unwrap()
                .retain(|r| !(r.child_id == child && r.milestone_id == milestone_id));
            Ok(())
        }
    }

    const POLIO_DOSE_1: &str = "Polio dose 1";

    #[test]
    fn milestone_keys_are_deterministic() {
        let a = milestone_key("4-6 months", MilestoneCategory::Physical, 1);
        let b = milestone_key("4-6 months", MilestoneCategory::Physical, 1);
        assert_eq!(a, b);
        assert_eq!(a, "4-6-months_physical_1");
        assert_eq!(
            milestone_key("0-3 months", MilestoneCategory::Social, 0),
            "0-3-months_social_0"
        );
    }

    #[test]
    fn vaccine_names_are_globally_unique_in_the_schedule() {
        let mut seen = HashSet::new();
        for group in VACCINATION_SCHEDULE {
            for vaccine in group.vaccines {
                assert!(seen.insert(*vaccine), "duplicate vaccine name: {vaccine}");
            }
        }
    }

    #[tokio::test]
    async fn toggling_twice_restores_the_pre_toggle_state() {
        let store = Arc::new(FakeGrowthStore::default());
        let child = Uuid::new_v4();
        let mut tracker = GrowthTracker::new(store.clone());
        tracker.select_child(Some(child)).await.unwrap();

        let on = tracker.toggle_vaccine(POLIO_DOSE_1).await.unwrap();
        assert_eq!(on, ToggleOutcome::Recorded);
        assert!(tracker.is_vaccine_completed(POLIO_DOSE_1));
        assert_eq!(store.vaccine_names(child), vec![POLIO_DOSE_1.to_string()]);

        let off = tracker.toggle_vaccine(POLIO_DOSE_1).await.unwrap();
        assert_eq!(off, ToggleOutcome::Cleared);
        assert!(!tracker.is_vaccine_completed(POLIO_DOSE_1));
        assert!(store.vaccine_names(child).is_empty());
        assert!(!tracker.is_vaccine_pending(POLIO_DOSE_1));
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back_the_optimistic_flip() {
        let store = Arc::new(FakeGrowthStore::default());
        let child = Uuid::new_v4();
        let mut tracker = GrowthTracker::new(store.clone());
        tracker.select_child(Some(child)).await.unwrap();
        *store.fail_writes.lock().unwrap() = true;

        let result = tracker.toggle_vaccine(POLIO_DOSE_1).await;

        assert!(matches!(result, Err(GrowthError::SaveFailed(_))));
        assert!(!tracker.is_vaccine_completed(POLIO_DOSE_1));
        assert!(store.vaccine_names(child).is_empty());
        assert!(!tracker.is_vaccine_pending(POLIO_DOSE_1));
    }

    #[tokio::test]
    async fn toggling_without_a_child_is_refused() {
        let store = Arc::new(FakeGrowthStore::default());
        let mut tracker = GrowthTracker::new(store);

        let result = tracker.toggle_vaccine(POLIO_DOSE_1).await;
        assert!(matches!(result, Err(GrowthError::NoChildSelected)));
    }

    #[tokio::test]
    async fn milestone_toggle_round_trips_through_the_store() {
        let store = Arc::new(FakeGrowthStore::default());
        let child = Uuid::new_v4();
        let mut tracker = GrowthTracker::new(store.clone());
        tracker.select_child(Some(child)).await.unwrap();

        let group = &MILESTONES[1];
        let description = group.physical[0];
        tracker
            .toggle_milestone(group.age_range, MilestoneCategory::Physical, 0, description)
            .await
            .unwrap();

        let key = milestone_key(group.age_range, MilestoneCategory::Physical, 0);
        assert!(tracker.is_milestone_achieved(&key));
        {
            let stored = store.milestones.lock().unwrap();
            assert_eq!(stored.len(), 1);
            assert_eq!(stored[0].milestone_id, key);
            assert_eq!(stored[0].category, "physical");
            assert_eq!(stored[0].description, description);
            assert!(stored[0].achieved_at.is_some());
        }

        tracker
            .toggle_milestone(group.age_range, MilestoneCategory::Physical, 0, description)
            .await
            .unwrap();
        assert!(!tracker.is_milestone_achieved(&key));
        assert!(store.milestones.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn switching_children_never_shows_the_previous_childs_state() {
        let store = Arc::new(FakeGrowthStore::default());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let mut tracker = GrowthTracker::new(store.clone());

        tracker.select_child(Some(first)).await.unwrap();
        tracker.toggle_vaccine(POLIO_DOSE_1).await.unwrap();
        assert!(tracker.is_vaccine_completed(POLIO_DOSE_1));

        tracker.select_child(Some(second)).await.unwrap();
        assert!(!tracker.is_vaccine_completed(POLIO_DOSE_1));
        assert!(tracker.vaccine_history().is_empty());

        // The first child's records were untouched by the switch.
        assert_eq!(store.vaccine_names(first), vec![POLIO_DOSE_1.to_string()]);
    }

    #[tokio::test]
    async fn history_is_replaced_from_the_store_after_a_toggle() {
        let store = Arc::new(FakeGrowthStore::default());
        let child = Uuid::new_v4();
        let mut tracker = GrowthTracker::new(store.clone());
        tracker.select_child(Some(child)).await.unwrap();

        tracker.toggle_vaccine(POLIO_DOSE_1).await.unwrap();

        assert_eq!(tracker.vaccine_history().len(), 1);
        let record = &tracker.vaccine_history()[0];
        assert_eq!(record.vaccine_name, POLIO_DOSE_1);
        // Server-assigned fields came back with the authoritative re-fetch.
        assert!(record.completed_at.is_some());
    }
}
