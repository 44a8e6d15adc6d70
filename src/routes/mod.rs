pub mod attraction;
pub mod city;
pub mod reservation;
pub mod schedule;
pub mod tracker;
