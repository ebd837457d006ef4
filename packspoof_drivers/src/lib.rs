#![no_std]

// Licensed under the Apache License, Version 2.0
// Copyright 2024 Anton Khrustalev, creapunk.com

pub mod analog;
pub mod gpio;
pub mod pinout;
pub mod pwm;
pub mod timer;
