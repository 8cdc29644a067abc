//! Integration test harness — end-to-end flows through [`AppService`]
//! with mock port adapters.

mod command_flow_tests;
mod mock_hw;
mod service_tests;
