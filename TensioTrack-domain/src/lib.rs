// TensioTrack Domain
// Business rules of the blood pressure tracker and the state behind each screen

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Session state and screen gating
pub mod session;

// Form and dashboard controllers
pub mod controllers;

// Notifications between components
pub mod events;

// Authentication event logging
pub mod logging;

// Testing utilities - only available with mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
