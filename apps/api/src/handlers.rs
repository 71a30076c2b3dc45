pub mod access;
pub mod health;
pub mod relations;

#[cfg(test)]
mod test_support;
