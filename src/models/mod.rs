pub mod attraction;
pub mod city;
pub mod location;
pub mod reservation;
