mod deals;
mod health_check;
mod helpers;
mod orders;
