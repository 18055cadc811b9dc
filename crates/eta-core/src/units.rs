// eta-core/src/units.rs

use uom::si::f64::{
    AngularVelocity as UomAngularVelocity, Energy as UomEnergy, Mass as UomMass,
    MassDensity as UomMassDensity, Velocity as UomVelocity, Volume as UomVolume,
};

// Public canonical unit types (SI, f64)
pub type AngularVelocity = UomAngularVelocity;
pub type Density = UomMassDensity;
pub type Energy = UomEnergy;
pub type Mass = UomMass;
pub type Velocity = UomVelocity;
pub type Volume = UomVolume;

#[inline]
pub fn rad_per_s_to_rpm(omega: f64) -> f64 {
    use uom::si::angular_velocity::{radian_per_second, revolution_per_minute};
    AngularVelocity::new::<radian_per_second>(omega).get::<revolution_per_minute>()
}

#[inline]
pub fn rpm_to_rad_per_s(rpm: f64) -> f64 {
    use uom::si::angular_velocity::{radian_per_second, revolution_per_minute};
    AngularVelocity::new::<revolution_per_minute>(rpm).get::<radian_per_second>()
}

#[inline]
pub fn mps_to_kmh(v: f64) -> f64 {
    use uom::si::velocity::{kilometer_per_hour, meter_per_second};
    Velocity::new::<meter_per_second>(v).get::<kilometer_per_hour>()
}

/// Volume (ml) occupied by `grams` of a liquid of density `density_kg_per_m3`.
#[inline]
pub fn grams_to_millilitres(grams: f64, density_kg_per_m3: f64) -> f64 {
    use uom::si::mass::gram;
    use uom::si::mass_density::kilogram_per_cubic_meter;
    use uom::si::volume::milliliter;
    let mass = Mass::new::<gram>(grams);
    let rho = Density::new::<kilogram_per_cubic_meter>(density_kg_per_m3);
    let volume: Volume = mass / rho;
    volume.get::<milliliter>()
}

/// Volume (ml) of fuel whose combustion releases `joules`, for a fuel with
/// lower heating value `lhv_kj_per_kg` and density `density_kg_per_m3`.
#[inline]
pub fn joules_to_fuel_millilitres(joules: f64, lhv_kj_per_kg: f64, density_kg_per_m3: f64) -> f64 {
    use uom::si::energy::{joule, kilojoule};
    let energy = Energy::new::<joule>(joules);
    let kilograms = energy.get::<kilojoule>() / lhv_kj_per_kg;
    grams_to_millilitres(kilograms * 1000.0, density_kg_per_m3)
}

pub mod constants {
    pub const G0_MPS2: f64 = 9.81;
}
