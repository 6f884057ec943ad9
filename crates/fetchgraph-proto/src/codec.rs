//! rkyv encoding of request and response envelopes.

use rkyv::util::AlignedVec;

use crate::message::{Request, Response};
use crate::Error;

/// Serialize a request.
pub fn encode_request(request: &Request) -> Result<Vec<u8>, Error> {
    rkyv::to_bytes::<rkyv::rancor::Error>(request)
        .map(|bytes| bytes.to_vec())
        .map_err(|e| Error::Serialization(format!("failed to serialize request: {}", e)))
}

/// Deserialize a request.
pub fn decode_request(bytes: &[u8]) -> Result<Request, Error> {
    let aligned = align(bytes);
    rkyv::from_bytes::<Request, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Deserialization(format!("failed to deserialize request: {}", e)))
}

/// Serialize a response.
pub fn encode_response(response: &Response) -> Result<Vec<u8>, Error> {
    rkyv::to_bytes::<rkyv::rancor::Error>(response)
        .map(|bytes| bytes.to_vec())
        .map_err(|e| Error::Serialization(format!("failed to serialize response: {}", e)))
}

/// Deserialize a response.
pub fn decode_response(bytes: &[u8]) -> Result<Response, Error> {
    let aligned = align(bytes);
    rkyv::from_bytes::<Response, rkyv::rancor::Error>(&aligned)
        .map_err(|e| Error::Deserialization(format!("failed to deserialize response: {}", e)))
}

// Transport buffers carry no alignment guarantee.
fn align(bytes: &[u8]) -> AlignedVec {
    let mut aligned = AlignedVec::with_capacity(bytes.len());
    aligned.extend_from_slice(bytes);
    aligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::{ConditionOperator, JoinOperator, LogicalOperator};
    use crate::query::{ColumnSet, Condition, FilterNode, LinkEntity, QueryExpression};
    use crate::result::{EntityCollection, Row};
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_request_survives_encoding() {
        let mut query = QueryExpression::new("flight");
        query.columns = ColumnSet::All;
        query.filter_nodes.push(FilterNode {
            link: None,
            parent: None,
            operator: LogicalOperator::And,
            conditions: vec![
                Condition::new("completed", ConditionOperator::Equal, vec![true.into()]),
                Condition::new("duration", ConditionOperator::GreaterThan, vec![5.into()]),
            ],
        });
        query.link_entities.push(LinkEntity {
            parent: None,
            from_entity: "flight".into(),
            from_column: "flightid".into(),
            to_entity: "passengers_in_flight".into(),
            to_column: "flightid".into(),
            join_operator: JoinOperator::LeftOuter,
            alias: "passengers_in_flight".into(),
            columns: ColumnSet::columns(["flightid"]),
        });
        query.top = Some(50);

        let request = Request::retrieve_multiple(1, query);
        let bytes = encode_request(&request).unwrap();
        assert_eq!(decode_request(&bytes).unwrap(), request);
    }

    #[test]
    fn test_response_survives_encoding() {
        let row = Row::new()
            .with("name", "Morning hop")
            .with("passenger.contactid", Value::Uuid([4; 16]));
        let response = Response::collection(9, EntityCollection::new("flight", vec![row]));

        let bytes = encode_response(&response).unwrap();
        assert_eq!(decode_response(&bytes).unwrap(), response);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_response(&[1, 2, 3]).is_err());
    }
}
