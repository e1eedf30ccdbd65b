pub mod fact_provider;
