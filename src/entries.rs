//! Experience and education entries embedded in a profile.
//!
//! Both lists are ordered newest-first by insertion, never by their date
//! fields. Entries are addressed by id with a linear scan; the lists stay
//! small enough that an index structure would not pay for itself.

use uuid::Uuid;

use crate::{
    error::{AppError, FieldError},
    models::{Education, Experience, ExperiencePayload, EducationPayload, overwrite, overwrite_opt, provided},
};

pub trait ProfileEntry {
    fn id(&self) -> Uuid;
}

impl ProfileEntry for Experience {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl ProfileEntry for Education {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// New entries always land at the front of the list.
pub fn insert_front<T: ProfileEntry>(entries: &mut Vec<T>, entry: T) {
    entries.insert(0, entry);
}

pub fn position_of<T: ProfileEntry>(entries: &[T], id: Uuid) -> Option<usize> {
    entries.iter().position(|entry| entry.id() == id)
}

/// Removes exactly one entry, keeping the order of the rest. A second call
/// with the same id finds nothing; deletion is not idempotent by design.
pub fn remove_by_id<T: ProfileEntry>(entries: &mut Vec<T>, id: Uuid) -> Option<T> {
    position_of(entries, id).map(|index| entries.remove(index))
}

impl Experience {
    pub fn try_build(payload: ExperiencePayload) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        if provided(&payload.title).is_none() {
            errors.push(FieldError::new("title", "Title is required!"));
        }
        if provided(&payload.company).is_none() {
            errors.push(FieldError::new("company", "Company is required!"));
        }
        if payload.from.is_none() {
            errors.push(FieldError::new("from", "From date is required!"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            title: payload.title.unwrap_or_default(),
            company: payload.company.unwrap_or_default(),
            location: payload.location,
            from: payload.from.unwrap_or_default(),
            to: payload.to,
            current: payload.current,
            description: payload.description,
        })
    }

    /// Partial update: only supplied fields overwrite, empty strings count
    /// as absent. `current` is the exception, an explicit `false` sticks.
    pub fn apply(&mut self, update: &ExperiencePayload) {
        overwrite(&mut self.title, &update.title);
        overwrite(&mut self.company, &update.company);
        overwrite_opt(&mut self.location, &update.location);
        if let Some(from) = update.from {
            self.from = from;
        }
        if update.to.is_some() {
            self.to = update.to;
        }
        if update.current.is_some() {
            self.current = update.current;
        }
        overwrite_opt(&mut self.description, &update.description);
    }
}

impl Education {
    pub fn try_build(payload: EducationPayload) -> Result<Self, AppError> {
        let mut errors = Vec::new();

        if provided(&payload.school).is_none() {
            errors.push(FieldError::new("school", "School is required!"));
        }
        if provided(&payload.degree).is_none() {
            errors.push(FieldError::new("degree", "Degree is required!"));
        }
        if provided(&payload.field_of_study).is_none() {
            errors.push(FieldError::new("fieldOfStudy", "Field of study is required!"));
        }
        if payload.from.is_none() {
            errors.push(FieldError::new("from", "From date is required!"));
        }
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            school: payload.school.unwrap_or_default(),
            degree: payload.degree.unwrap_or_default(),
            field_of_study: payload.field_of_study.unwrap_or_default(),
            from: payload.from.unwrap_or_default(),
            to: payload.to,
            current: payload.current,
            description: payload.description,
        })
    }

    pub fn apply(&mut self, update: &EducationPayload) {
        overwrite(&mut self.school, &update.school);
        overwrite(&mut self.degree, &update.degree);
        overwrite(&mut self.field_of_study, &update.field_of_study);
        if let Some(from) = update.from {
            self.from = from;
        }
        if update.to.is_some() {
            self.to = update.to;
        }
        if update.current.is_some() {
            self.current = update.current;
        }
        overwrite_opt(&mut self.description, &update.description);
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn experience(title: &str, from: NaiveDate) -> Experience {
        Experience {
            id: Uuid::new_v4(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            from,
            to: None,
            current: None,
            description: None,
        }
    }

    #[test]
    fn insert_lands_at_front_regardless_of_dates() {
        let mut entries = Vec::new();

        insert_front(&mut entries, experience("newer job", date(2021, 1, 1)));
        insert_front(&mut entries, experience("older job", date(2015, 1, 1)));

        assert_eq!(entries[0].title, "older job");
        assert_eq!(entries[1].title, "newer job");
    }

    #[test]
    fn position_of_missing_id_is_none() {
        let entries = vec![experience("job", date(2020, 1, 1))];

        assert_eq!(position_of(&entries, Uuid::new_v4()), None);
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut entries = Vec::new();
        for title in ["third", "second", "first"] {
            insert_front(&mut entries, experience(title, date(2020, 1, 1)));
        }
        let middle = entries[1].id;

        let removed = remove_by_id(&mut entries, middle);

        assert_eq!(removed.unwrap().title, "second");
        assert_eq!(entries[0].title, "first");
        assert_eq!(entries[1].title, "third");
    }

    #[test]
    fn second_delete_of_same_id_finds_nothing() {
        let mut entries = vec![experience("job", date(2020, 1, 1))];
        let id = entries[0].id;

        assert!(remove_by_id(&mut entries, id).is_some());
        assert!(remove_by_id(&mut entries, id).is_none());
    }

    #[test]
    fn explicit_current_false_overwrites() {
        let mut entry = experience("job", date(2020, 1, 1));
        entry.current = Some(true);

        entry.apply(&ExperiencePayload {
            current: Some(false),
            ..Default::default()
        });

        assert_eq!(entry.current, Some(false));
    }

    #[test]
    fn empty_title_leaves_stored_title_unchanged() {
        let mut entry = experience("kept", date(2020, 1, 1));

        entry.apply(&ExperiencePayload {
            title: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(entry.title, "kept");
    }

    #[test]
    fn absent_fields_stay_untouched_on_update() {
        let mut entry = experience("job", date(2020, 1, 1));
        entry.description = Some("original".to_string());
        entry.to = Some(date(2022, 6, 1));

        entry.apply(&ExperiencePayload {
            company: Some("NewCorp".to_string()),
            ..Default::default()
        });

        assert_eq!(entry.company, "NewCorp");
        assert_eq!(entry.description.as_deref(), Some("original"));
        assert_eq!(entry.to, Some(date(2022, 6, 1)));
        assert_eq!(entry.current, None);
    }

    #[test]
    fn build_rejects_missing_required_fields() {
        let result = Experience::try_build(ExperiencePayload::default());

        let Err(AppError::Validation(errors)) = result else {
            panic!("expected validation errors");
        };
        let params: Vec<&str> = errors.iter().map(|error| error.param).collect();
        assert_eq!(params, ["title", "company", "from"]);
    }

    #[test]
    fn education_field_of_study_updates_by_presence() {
        let mut entry = Education::try_build(EducationPayload {
            school: Some("Purdue".to_string()),
            degree: Some("BSc".to_string()),
            field_of_study: Some("CS".to_string()),
            from: Some(date(2018, 8, 1)),
            ..Default::default()
        })
        .unwrap();

        entry.apply(&EducationPayload {
            field_of_study: Some("Math".to_string()),
            degree: Some(String::new()),
            ..Default::default()
        });

        assert_eq!(entry.field_of_study, "Math");
        assert_eq!(entry.degree, "BSc");
    }
}
