mod health;
mod packages;
mod stars;
