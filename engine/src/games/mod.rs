pub mod wheel_session;
