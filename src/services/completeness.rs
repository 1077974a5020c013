use crate::models::{AppointmentDetails, AppointmentRequest, Field};

#[derive(Debug, Clone, PartialEq)]
pub enum Completeness {
    Complete(AppointmentDetails),
    Incomplete { missing: Vec<Field> },
}

pub fn missing_fields(request: &AppointmentRequest) -> Vec<Field> {
    Field::ALL
        .into_iter()
        .filter(|f| request.get(*f).map_or(true, |v| v.trim().is_empty()))
        .collect()
}

pub fn is_complete(request: &AppointmentRequest) -> bool {
    missing_fields(request).is_empty()
}

pub fn check(request: &AppointmentRequest) -> Completeness {
    let missing = missing_fields(request);
    if !missing.is_empty() {
        return Completeness::Incomplete { missing };
    }

    let value = |f: Field| request.get(f).unwrap_or_default().to_string();
    Completeness::Complete(AppointmentDetails {
        patient_name: value(Field::PatientName),
        specialty: value(Field::Specialty),
        reason: value(Field::Reason),
        date: value(Field::Date),
        time: value(Field::Time),
        phone: value(Field::Phone),
        email: value(Field::Email),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> AppointmentRequest {
        let mut req = AppointmentRequest::default();
        for f in Field::ALL {
            req.set(f, "x");
        }
        req
    }

    #[test]
    fn test_complete_when_all_present() {
        assert!(is_complete(&full()));
        assert!(matches!(check(&full()), Completeness::Complete(_)));
    }

    #[test]
    fn test_each_missing_field_fails() {
        for f in Field::ALL {
            let mut req = full();
            match f {
                Field::PatientName => req.patient_name = None,
                Field::Specialty => req.specialty = None,
                Field::Reason => req.reason = None,
                Field::Date => req.date = None,
                Field::Time => req.time = None,
                Field::Phone => req.phone = None,
                Field::Email => req.email = None,
            }
            assert!(!is_complete(&req), "{f:?} missing should be incomplete");
            assert_eq!(missing_fields(&req), vec![f]);
        }
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let mut req = full();
        req.set(Field::Email, "  ");
        req.set(Field::Reason, "");
        assert_eq!(
            check(&req),
            Completeness::Incomplete {
                missing: vec![Field::Reason, Field::Email]
            }
        );
    }

    #[test]
    fn test_no_shape_validation() {
        let mut req = full();
        req.set(Field::Email, "not-an-email");
        req.set(Field::Phone, "call me maybe");
        assert!(is_complete(&req));
    }

    #[test]
    fn test_empty_request() {
        assert_eq!(missing_fields(&AppointmentRequest::default()).len(), 7);
    }
}
