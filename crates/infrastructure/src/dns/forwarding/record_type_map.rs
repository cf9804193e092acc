//! Mapping between `labelns_domain::RecordType` and `hickory_proto::rr::RecordType`.

use hickory_proto::rr::RecordType as HickoryRecordType;
use labelns_domain::RecordType;

pub struct RecordTypeMapper;

impl RecordTypeMapper {
    pub fn to_hickory(record_type: RecordType) -> HickoryRecordType {
        match record_type {
            RecordType::A => HickoryRecordType::A,
            RecordType::AAAA => HickoryRecordType::AAAA,
            RecordType::ANY => HickoryRecordType::ANY,
        }
    }

    /// `None` for every type the pipeline does not answer.
    pub fn from_hickory(record_type: HickoryRecordType) -> Option<RecordType> {
        match record_type {
            HickoryRecordType::A => Some(RecordType::A),
            HickoryRecordType::AAAA => Some(RecordType::AAAA),
            HickoryRecordType::ANY => Some(RecordType::ANY),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_supported_types() {
        for rt in [RecordType::A, RecordType::AAAA, RecordType::ANY] {
            let hickory = RecordTypeMapper::to_hickory(rt);
            assert_eq!(RecordTypeMapper::from_hickory(hickory), Some(rt));
        }
    }

    #[test]
    fn test_unsupported_types() {
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::MX), None);
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::TXT), None);
        assert_eq!(RecordTypeMapper::from_hickory(HickoryRecordType::SOA), None);
    }
}
