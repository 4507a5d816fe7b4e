pub mod assets;
#[cfg(test)]
pub(crate) mod test_support;

pub use assets::AssetService;
