use serde::{Deserialize, Serialize};

use crate::model::{City, CityId, NewCity};
use crate::source::StoreConfig;

pub type CityResponse = crux_http::Result<crux_http::Response<City>>;
pub type CityListResponse = crux_http::Result<crux_http::Response<Vec<City>>>;
pub type EmptyResponse = crux_http::Result<crux_http::Response<Vec<u8>>>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub enum Event {
    // Sent by the shell
    Configure(StoreConfig),
    FetchCities,
    GetCity(CityId),
    CreateCity(NewCity),
    DeleteCity(CityId),

    // HTTP responses, produced inside the core only. `generation` is the
    // configuration the request was sent under.
    #[serde(skip)]
    CitiesFetched {
        generation: u64,
        result: CityListResponse,
    },
    #[serde(skip)]
    CityFetched { generation: u64, result: CityResponse },
    #[serde(skip)]
    CityCreated { generation: u64, result: CityResponse },
    #[serde(skip)]
    CityRemoved {
        generation: u64,
        id: CityId,
        result: EmptyResponse,
    },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Event::Configure(_) => "configure",
            Event::FetchCities => "fetch_cities",
            Event::GetCity(_) => "get_city",
            Event::CreateCity(_) => "create_city",
            Event::DeleteCity(_) => "delete_city",
            Event::CitiesFetched { .. } => "cities_fetched",
            Event::CityFetched { .. } => "city_fetched",
            Event::CityCreated { .. } => "city_created",
            Event::CityRemoved { .. } => "city_removed",
        }
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            Event::CitiesFetched { generation, .. }
            | Event::CityFetched { generation, .. }
            | Event::CityCreated { generation, .. }
            | Event::CityRemoved { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Operations require a configured store; responses do not.
    pub fn is_operation(&self) -> bool {
        matches!(
            self,
            Event::FetchCities | Event::GetCity(_) | Event::CreateCity(_) | Event::DeleteCity(_)
        )
    }
}
