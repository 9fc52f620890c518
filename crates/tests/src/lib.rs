//! Cross-crate tests for vstlog

#[cfg(test)]
mod pipeline_integration;
