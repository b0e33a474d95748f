//! UI module - reusable components and widgets

pub mod components;
