// lib.rs - City store core shared by every shell

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod capabilities;
pub mod event;
pub mod model;
pub mod position;
pub mod source;
pub mod store;

use serde::{Deserialize, Serialize};

pub use app::App;
pub use capabilities::{ApiBase, Capabilities, ConfigError, Effect};
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use model::{City, CityId, Model, NewCity, Position};
pub use position::{PositionError, UrlPosition};
pub use source::{DataSource, SeedSource, SourceError, StoreConfig};
pub use store::{reduce, Action, StoreError, StoreState};

pub const LOAD_CITIES_ERROR: &str = "There was an error loading cities";
pub const GET_CITY_ERROR: &str = "There was an error loading the city...";
pub const CREATE_CITY_ERROR: &str = "There was an error creating the city...";
pub const DELETE_CITY_ERROR: &str = "There was an error deleting the city...";

/// Read-only snapshot handed to the shell on every render.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ViewModel {
    pub cities: Vec<City>,
    pub is_loading: bool,
    pub current_city: Option<City>,
    pub error: String,
    pub has_error: bool,
    pub city_count: usize,
}

impl From<&StoreState> for ViewModel {
    fn from(state: &StoreState) -> Self {
        Self {
            cities: state.cities.clone(),
            is_loading: state.is_loading,
            current_city: state.current_city.clone(),
            error: state.error.clone(),
            has_error: state.has_error(),
            city_count: state.cities.len(),
        }
    }
}

pub mod app {
    use super::*;
    use crate::capabilities::JSON_CONTENT_TYPE;
    use tracing::{debug, error, info, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        fn reject(operation: &'static str, err: &SourceError, message: &str) -> Action {
            warn!(operation, error = %err, "city operation failed");
            Action::Rejected(message.to_string())
        }

        fn successful<T>(
            result: crux_http::Result<crux_http::Response<T>>,
        ) -> Result<crux_http::Response<T>, SourceError> {
            let response = result.map_err(|e| SourceError::Transport(e.to_string()))?;
            let status = u16::from(response.status());
            if !(200..300).contains(&status) {
                return Err(SourceError::Status(status));
            }
            Ok(response)
        }

        fn response_body<T>(
            result: crux_http::Result<crux_http::Response<T>>,
        ) -> Result<T, SourceError> {
            Self::successful(result)?
                .take_body()
                .ok_or_else(|| SourceError::Decode("empty response body".into()))
        }

        fn fetch_cities(model: &mut Model, caps: &Capabilities) -> Result<(), StoreError> {
            model.dispatch(Action::Loading);
            let generation = model.generation;

            let action = match model.source_mut()? {
                DataSource::Seeded(seed) => Action::CitiesListed(seed.list()),
                DataSource::Remote(base) => {
                    caps.http
                        .get(base.cities_url())
                        .expect_json::<Vec<City>>()
                        .send(move |result| Event::CitiesFetched { generation, result });
                    caps.render.render();
                    return Ok(());
                }
            };

            model.dispatch(action);
            caps.render.render();
            Ok(())
        }

        fn get_city(id: CityId, model: &mut Model, caps: &Capabilities) -> Result<(), StoreError> {
            if model.state.current_city_id() == Some(&id) {
                debug!(%id, "city already selected");
                return Ok(());
            }

            model.dispatch(Action::Loading);
            let generation = model.generation;

            let action = match model.source_mut()? {
                DataSource::Seeded(seed) => match seed.get(&id) {
                    Ok(city) => Action::CitiesLoaded(city),
                    Err(e) => Self::reject("get_city", &e, GET_CITY_ERROR),
                },
                DataSource::Remote(base) => {
                    caps.http
                        .get(base.city_url(id.as_str()))
                        .expect_json::<City>()
                        .send(move |result| Event::CityFetched { generation, result });
                    caps.render.render();
                    return Ok(());
                }
            };

            model.dispatch(action);
            caps.render.render();
            Ok(())
        }

        fn create_city(
            new_city: NewCity,
            model: &mut Model,
            caps: &Capabilities,
        ) -> Result<(), StoreError> {
            model.dispatch(Action::Loading);
            let generation = model.generation;

            let action = match model.source_mut()? {
                DataSource::Seeded(seed) => Action::CitiesCreated(seed.create(new_city)),
                DataSource::Remote(base) => {
                    let request = caps
                        .http
                        .post(base.cities_url())
                        .header("Content-Type", JSON_CONTENT_TYPE)
                        .body_json(&new_city);
                    match request {
                        Ok(request) => {
                            request
                                .expect_json::<City>()
                                .send(move |result| Event::CityCreated { generation, result });
                            caps.render.render();
                            return Ok(());
                        }
                        Err(e) => Self::reject(
                            "create_city",
                            &SourceError::Encode(e.to_string()),
                            CREATE_CITY_ERROR,
                        ),
                    }
                }
            };

            model.dispatch(action);
            caps.render.render();
            Ok(())
        }

        fn delete_city(
            id: CityId,
            model: &mut Model,
            caps: &Capabilities,
        ) -> Result<(), StoreError> {
            model.dispatch(Action::Loading);
            let generation = model.generation;
            let known = model.state.contains(&id);

            let action = match model.source_mut()? {
                DataSource::Seeded(seed) => match seed.delete(&id) {
                    Ok(id) => Action::CitiesDeleted(id),
                    Err(e) => Self::reject("delete_city", &e, DELETE_CITY_ERROR),
                },
                DataSource::Remote(_) if !known => {
                    Self::reject("delete_city", &SourceError::NotFound(id), DELETE_CITY_ERROR)
                }
                DataSource::Remote(base) => {
                    caps.http
                        .delete(base.city_url(id.as_str()))
                        .send(move |result| Event::CityRemoved {
                            generation,
                            id: id.clone(),
                            result,
                        });
                    caps.render.render();
                    return Ok(());
                }
            };

            model.dispatch(action);
            caps.render.render();
            Ok(())
        }

        fn handle(event: Event, model: &mut Model, caps: &Capabilities) -> Result<(), StoreError> {
            if event.is_operation() && !model.is_configured() {
                return Err(StoreError::NotConfigured);
            }

            if let Some(generation) = event.generation() {
                if generation != model.generation {
                    debug!(
                        event = event.name(),
                        generation,
                        current = model.generation,
                        "dropping response from a previous configuration"
                    );
                    return Ok(());
                }
            }

            match event {
                Event::Configure(config) => {
                    model.generation += 1;
                    model.state = StoreState::default();
                    model.source = Some(config.into_source());
                    info!(generation = model.generation, "city store configured");
                    Self::fetch_cities(model, caps)?;
                }

                Event::FetchCities => Self::fetch_cities(model, caps)?,
                Event::GetCity(id) => Self::get_city(id, model, caps)?,
                Event::CreateCity(new_city) => Self::create_city(new_city, model, caps)?,
                Event::DeleteCity(id) => Self::delete_city(id, model, caps)?,

                Event::CitiesFetched { result, .. } => {
                    let action = match Self::response_body(result) {
                        Ok(cities) => Action::CitiesListed(cities),
                        Err(e) => Self::reject("fetch_cities", &e, LOAD_CITIES_ERROR),
                    };
                    model.dispatch(action);
                    caps.render.render();
                }

                Event::CityFetched { result, .. } => {
                    let action = match Self::response_body(result) {
                        Ok(city) => Action::CitiesLoaded(city),
                        Err(e) => Self::reject("get_city", &e, GET_CITY_ERROR),
                    };
                    model.dispatch(action);
                    caps.render.render();
                }

                Event::CityCreated { result, .. } => {
                    let action = match Self::response_body(result) {
                        Ok(city) if model.state.contains(&city.id) => Self::reject(
                            "create_city",
                            &SourceError::DuplicateId(city.id),
                            CREATE_CITY_ERROR,
                        ),
                        Ok(city) => Action::CitiesCreated(city),
                        Err(e) => Self::reject("create_city", &e, CREATE_CITY_ERROR),
                    };
                    model.dispatch(action);
                    caps.render.render();
                }

                Event::CityRemoved { id, result, .. } => {
                    let action = match Self::successful(result) {
                        Ok(_) if !model.state.contains(&id) => Self::reject(
                            "delete_city",
                            &SourceError::NotFound(id),
                            DELETE_CITY_ERROR,
                        ),
                        Ok(_) => Action::CitiesDeleted(id),
                        Err(SourceError::Status(404)) => Self::reject(
                            "delete_city",
                            &SourceError::NotFound(id),
                            DELETE_CITY_ERROR,
                        ),
                        Err(e) => Self::reject("delete_city", &e, DELETE_CITY_ERROR),
                    };
                    model.dispatch(action);
                    caps.render.render();
                }
            }

            Ok(())
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let event_name = event.name();
            debug!(event = event_name, "update");

            // Misuse is a bug in the shell, not a runtime condition.
            if let Err(e) = Self::handle(event, model, caps) {
                error!(event = event_name, error = %e, "city store misuse");
                panic!("{e}");
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            ViewModel::from(&model.state)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crux_core::testing::AppTester;

    fn city(id: &str, name: &str, country: &str) -> City {
        NewCity::new(name, country).into_city(CityId::new(id))
    }

    fn seed() -> Vec<City> {
        vec![
            city("17806751", "Lisbon", "Portugal"),
            city("98443197", "Madrid", "Spain"),
            city("98443198", "Berlin", "Germany"),
        ]
    }

    fn configured(cities: Vec<City>) -> (AppTester<App, Effect>, Model) {
        let app = AppTester::<App, Effect>::default();
        let mut model = Model::default();
        app.update(Event::Configure(StoreConfig::seeded(cities)), &mut model);
        (app, model)
    }

    mod seeded_tests {
        use super::*;

        #[test]
        fn configure_lists_the_seed() {
            let (app, model) = configured(seed());
            let view = app.view(&model);

            assert_eq!(view.city_count, 3);
            assert_eq!(view.cities[0].city_name, "Lisbon");
            assert!(!view.is_loading);
            assert!(!view.has_error);
            assert_eq!(view.current_city, None);
        }

        #[test]
        fn get_city_selects_the_record() {
            let (app, mut model) = configured(seed());
            let update = app.update(Event::GetCity(CityId::new("98443197")), &mut model);

            assert_eq!(model.state.current_city.as_ref().unwrap().city_name, "Madrid");
            assert!(!model.state.is_loading);
            assert!(update.effects.iter().any(|e| matches!(e, Effect::Render(_))));
        }

        #[test]
        fn get_current_city_is_a_no_op() {
            let (app, mut model) = configured(seed());
            app.update(Event::GetCity(CityId::new("98443197")), &mut model);
            let before = model.state.clone();

            let update = app.update(Event::GetCity(CityId::new("98443197")), &mut model);

            assert_eq!(model.state, before);
            assert!(update.effects.is_empty());
        }

        #[test]
        fn get_unknown_city_rejects() {
            let (app, mut model) = configured(seed());
            app.update(Event::GetCity(CityId::new("nope")), &mut model);

            assert_eq!(model.state.error, GET_CITY_ERROR);
            assert!(!model.state.is_loading);
            assert_eq!(model.state.current_city, None);
        }

        #[test]
        fn create_then_delete_round_trip() {
            let (app, mut model) = configured(Vec::new());

            app.update(
                Event::CreateCity(NewCity::new("Rome", "Italy").with_emoji("🇮🇹")),
                &mut model,
            );
            assert_eq!(model.state.cities.len(), 1);
            let created = model.state.current_city.clone().unwrap();
            assert_eq!(created.city_name, "Rome");
            assert_eq!(model.state.cities[0], created);

            app.update(Event::DeleteCity(created.id.clone()), &mut model);
            assert!(model.state.cities.is_empty());
            assert_eq!(model.state.current_city, None);
            assert!(!model.state.has_error());
        }

        #[test]
        fn create_then_get_returns_the_created_record() {
            let (app, mut model) = configured(seed());
            app.update(Event::CreateCity(NewCity::new("Rome", "Italy")), &mut model);
            let created = model.state.current_city.clone().unwrap();

            app.update(Event::GetCity(CityId::new("17806751")), &mut model);
            app.update(Event::GetCity(created.id.clone()), &mut model);

            assert_eq!(model.state.current_city, Some(created));
        }

        #[test]
        fn create_without_a_name_still_adds_a_city() {
            let (app, mut model) = configured(seed());
            app.update(Event::CreateCity(NewCity::new("", "Italy")), &mut model);

            assert_eq!(model.state.cities.len(), 4);
            assert!(!model.state.has_error());
            assert!(!model.state.is_loading);
            let created = model.state.current_city.clone().unwrap();
            assert!(created.city_name.is_empty());
            assert_eq!(model.state.cities.last(), Some(&created));
        }

        #[test]
        fn delete_unknown_city_only_sets_error() {
            let (app, mut model) = configured(seed());
            app.update(Event::GetCity(CityId::new("17806751")), &mut model);
            let cities = model.state.cities.clone();
            let current = model.state.current_city.clone();

            app.update(Event::DeleteCity(CityId::new("nonexistent")), &mut model);

            assert_eq!(model.state.cities, cities);
            assert_eq!(model.state.current_city, current);
            assert_eq!(model.state.error, "There was an error deleting the city...");
            assert!(!model.state.is_loading);
        }

        #[test]
        fn delete_other_city_keeps_selection() {
            let (app, mut model) = configured(seed());
            app.update(Event::GetCity(CityId::new("17806751")), &mut model);
            app.update(Event::DeleteCity(CityId::new("98443198")), &mut model);

            assert_eq!(model.state.cities.len(), 2);
            assert_eq!(
                model.state.current_city_id(),
                Some(&CityId::new("17806751"))
            );
        }

        #[test]
        fn reconfigure_resets_state() {
            let (app, mut model) = configured(seed());
            app.update(Event::DeleteCity(CityId::new("missing")), &mut model);
            assert!(model.state.has_error());

            assert_eq!(model.generation, 1);

            app.update(Event::Configure(StoreConfig::seeded(Vec::new())), &mut model);
            assert_eq!(model.state, StoreState::default());
            assert_eq!(model.generation, 2);
        }

        #[test]
        #[should_panic(expected = "not configured")]
        fn operations_before_configure_are_fatal() {
            let app = AppTester::<App, Effect>::default();
            let mut model = Model::default();
            app.update(Event::GetCity(CityId::new("1")), &mut model);
        }
    }

    mod sequence_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::HashSet;

        #[derive(Clone, Debug)]
        enum Op {
            Create(String),
            DeleteExisting(usize),
            DeleteMissing,
            Get(usize),
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                "[A-Za-z ]{0,12}".prop_map(Op::Create),
                any::<usize>().prop_map(Op::DeleteExisting),
                Just(Op::DeleteMissing),
                any::<usize>().prop_map(Op::Get),
            ]
        }

        proptest! {
            #[test]
            fn ids_stay_unique_and_lengths_track_operations(ops in prop::collection::vec(op(), 0..40)) {
                let (app, mut model) = configured(seed());

                for op in ops {
                    let before = model.state.cities.len();
                    match op {
                        Op::Create(name) => {
                            app.update(Event::CreateCity(NewCity::new(name, "Anywhere")), &mut model);
                            prop_assert_eq!(model.state.cities.len(), before + 1);
                            let current = model.state.current_city.clone().unwrap();
                            prop_assert_eq!(model.state.cities.last(), Some(&current));
                        }
                        Op::DeleteExisting(i) if before > 0 => {
                            let id = model.state.cities[i % before].id.clone();
                            app.update(Event::DeleteCity(id.clone()), &mut model);
                            prop_assert_eq!(model.state.cities.len(), before - 1);
                            prop_assert!(!model.state.contains(&id));
                            prop_assert_ne!(model.state.current_city_id(), Some(&id));
                        }
                        Op::DeleteExisting(_) | Op::DeleteMissing => {
                            app.update(Event::DeleteCity(CityId::new("missing")), &mut model);
                            prop_assert_eq!(model.state.cities.len(), before);
                            prop_assert_eq!(model.state.error.as_str(), DELETE_CITY_ERROR);
                        }
                        Op::Get(i) if before > 0 => {
                            let id = model.state.cities[i % before].id.clone();
                            app.update(Event::GetCity(id.clone()), &mut model);
                            prop_assert_eq!(model.state.current_city_id(), Some(&id));
                        }
                        Op::Get(_) => {}
                    }

                    prop_assert!(!model.state.is_loading);
                    let ids: HashSet<_> = model.state.cities.iter().map(|c| &c.id).collect();
                    prop_assert_eq!(ids.len(), model.state.cities.len());
                }
            }
        }
    }

    mod view_tests {
        use super::*;

        #[test]
        fn view_mirrors_state() {
            let state = StoreState {
                cities: seed(),
                is_loading: true,
                current_city: Some(seed()[1].clone()),
                error: DELETE_CITY_ERROR.into(),
            };
            let view = ViewModel::from(&state);

            assert_eq!(view.city_count, 3);
            assert!(view.is_loading);
            assert!(view.has_error);
            assert_eq!(view.current_city.unwrap().city_name, "Madrid");
        }
    }
}
