use std::fmt;

/// Vehicles stored in the warehouse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vehicle {
    Car(Car),
    Truck(Truck),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Car {
    pub id: u64,
    pub model: String,
    pub max_passengers: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truck {
    pub id: u64,
    pub model: String,
    pub max_load_kg: u32,
}

impl Car {
    pub const MODEL: &'static str = "SAAB";
    pub const MAX_PASSENGERS: u32 = 4;

    pub fn new(id: u64) -> Self {
        Self {
            id,
            model: Self::MODEL.to_owned(),
            max_passengers: Self::MAX_PASSENGERS,
        }
    }
}

impl Truck {
    pub const MODEL: &'static str = "VolvoTruck";
    pub const MAX_LOAD_KG: u32 = 4000;

    pub fn new(id: u64) -> Self {
        Self {
            id,
            model: Self::MODEL.to_owned(),
            max_load_kg: Self::MAX_LOAD_KG,
        }
    }
}

impl Vehicle {
    /// Builds a car or a truck with equal probability.
    pub fn random(id: u64) -> Self {
        if fastrand::bool() {
            Vehicle::Car(Car::new(id))
        } else {
            Vehicle::Truck(Truck::new(id))
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Vehicle::Car(c) => c.id,
            Vehicle::Truck(t) => t.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Vehicle::Car(_) => "Car",
            Vehicle::Truck(_) => "Truck",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            Vehicle::Car(c) => &c.model,
            Vehicle::Truck(t) => &t.model,
        }
    }
}

/// Multi-line description printed by dealers.
impl fmt::Display for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ID: {}", self.id())?;
        writeln!(f, "Model: {}", self.model())?;
        writeln!(f, "Type: {}", self.kind())?;
        match self {
            Vehicle::Car(c) => write!(f, "Max Passengers: {}", c.max_passengers),
            Vehicle::Truck(t) => write!(f, "Max Load: {} kg", t.max_load_kg),
        }
    }
}
