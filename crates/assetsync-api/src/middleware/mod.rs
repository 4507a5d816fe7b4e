pub mod cors;
pub mod request_id;

pub use cors::{allow_origin_layer, collection_preflight, item_preflight};
pub use request_id::{request_id_middleware, RequestId};
