#[cfg(test)]
mod principal_tests;
#[cfg(test)]
mod token_tests;
