use quiz_core::model::{Subject, SubjectId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubjectCardVm {
    pub id: SubjectId,
    pub name: String,
    pub avatar: String,
}

#[must_use]
pub fn map_subject_cards(subjects: &[Subject]) -> Vec<SubjectCardVm> {
    subjects
        .iter()
        .map(|subject| SubjectCardVm {
            id: subject.id(),
            name: subject.name().to_owned(),
            avatar: subject
                .name()
                .chars()
                .next()
                .map(|c| c.to_uppercase().collect())
                .unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{SubjectName, UserId};
    use quiz_core::time::fixed_now;

    #[test]
    fn cards_keep_order_and_take_initial() {
        let owner = UserId::generate();
        let subjects = vec![
            Subject::new(
                SubjectId::new(2),
                SubjectName::new("algebra").unwrap(),
                owner,
                fixed_now(),
            ),
            Subject::new(
                SubjectId::new(1),
                SubjectName::new("Élan vital").unwrap(),
                owner,
                fixed_now(),
            ),
        ];
        let cards = map_subject_cards(&subjects);
        assert_eq!(cards[0].id, SubjectId::new(2));
        assert_eq!(cards[0].avatar, "A");
        assert_eq!(cards[1].avatar, "É");
    }
}
