mod health_tests;
mod pipeline_tests;
mod sessions_tests;
mod websocket_tests;
