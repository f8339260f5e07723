//! Default simulated diffusers.

use serde_json::{Value, json};

/// A Pura 4 wall unit with two cartridges, a Pura Mini and a car diffuser.
pub(crate) fn default_records() -> Value {
    json!([
        {
            "deviceId": "a4:cf:12:34:56:01",
            "deviceType": "wall",
            "displayName": {"name": "Living Room"},
            "model": 1,
            "hwVersion": "4.0.1",
            "fwVersion": "1.4.2",
            "serialNumber": "PW4-VIRTUAL-01",
            "connected": true,
            "lastConnectedAt": 1_700_000_000,
            "controller": "always_on",
            "deviceLocation": {"latitude": 40.7608, "longitude": -111.891, "radius": 150},
            "ambientMode": false,
            "awayMode": {"enabled": false},
            "deviceDefaults": {
                "bay1Intensity": 6,
                "bay2Intensity": 4,
                "nightlight": {"active": false, "brightness": 5, "color": "ffb347"}
            },
            "deviceActiveState": {"activeBay": 0, "activeBayIntensity": 0},
            "bay1": {
                "code": "LAV01",
                "fragrance": {"name": "French Lavender", "expectedLifeHours": 120},
                "wearingTime": 86_400,
                "activeAt": null
            },
            "bay2": {
                "code": "CIT02",
                "fragrance": {"name": "Lemon Verbena", "expectedLifeHours": 120},
                "wearingTime": 21_600,
                "activeAt": null
            },
            "timer": null
        },
        {
            "deviceId": "d0:8b:7e:00:00:02",
            "deviceType": "mini",
            "displayName": {"name": "Office"},
            "model": 4,
            "hwVersion": "1.0",
            "fwVersion": "2.1.0",
            "serialNumber": "PM-VIRTUAL-02",
            "connected": true,
            "lastConnectedAt": null,
            "controller": "0",
            "awayMode": false,
            "deviceDefaults": {
                "bay1Intensity": 5,
                "nightlight": {"active": true, "brightness": 3, "color": "6a5acd"}
            },
            "bay1": {
                "code": "MIN03",
                "fragrance": {"name": "Mahogany Teakwood", "expectedLifeHours": 50},
                "wearingTime": 3_600,
                "activeAt": null,
                "remaining": {"percent": 78}
            },
            "timer": null
        },
        {
            "deviceId": "e1:22:33:00:00:03",
            "deviceType": "car",
            "displayName": {"name": "Car"},
            "model": "car",
            "hwVersion": "2.0",
            "fwVersion": "1.0.7",
            "connected": false,
            "deviceActiveState": {"activeBay": 1, "activeBayIntensity": 5},
            "bay1": {
                "code": "CAR04",
                "fragrance": {"name": "Ocean Air", "expectedLifeHours": 30},
                "wearingTime": 7_200
            }
        }
    ])
}
