mod aggregation_test;
mod service_test;
