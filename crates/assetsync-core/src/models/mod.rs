//! Domain models

pub mod asset;

pub use asset::{
    AssetDocument, AssetRecord, AssetStatus, AssetUpdate, AssetView, CreateAssetRequest,
    CreateAssetResponse, DeleteAssetResponse, NewAsset,
};
