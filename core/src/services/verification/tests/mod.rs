pub(crate) mod mocks;

mod service_tests;
