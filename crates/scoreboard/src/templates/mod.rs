pub mod components;
pub mod fragments;
pub mod layouts;
pub mod pages;
