pub mod form;
pub mod mutation;
pub mod settings;
pub mod store;

#[cfg(test)]
mod test_support;
