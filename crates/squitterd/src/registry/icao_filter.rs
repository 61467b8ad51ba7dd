//! Allow-lists a stream of decoded messages by downlink format and ICAO
//! address, so a connector can be scoped to a handful of airframes or a
//! subset of message types before it reaches the registry. This is a
//! static, operator-configured list (TOML, loaded once at startup), not
//! the recently-seen-address set the CRC repair path consults — that one
//! is [`squitter_core::icao::RecentIcaoSet`], built from live traffic and
//! aged out on a timer.
use squitter_core::decode::{TimedMessage, ICAO};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct IcaoFilter {
    pub df_filter: Option<Vec<String>>,
    pub aircraft_filter: Option<Vec<ICAO>>,
}

impl IcaoFilter {
    fn aircraft_in<T>(&self, icao24: &T) -> bool
    where
        T: Copy + Into<ICAO>,
    {
        if let Some(filter) = &self.aircraft_filter {
            if filter.contains(&(*icao24).into()) {
                return true;
            }
            return filter.is_empty();
        }
        true
    }

    fn df_in(&self, df: &str) -> bool {
        if let Some(filter) = &self.df_filter {
            if filter.contains(&df.to_string()) {
                return true;
            }
            return filter.is_empty();
        }
        true
    }

    pub fn is_in(&self, msg: &TimedMessage) -> bool {
        use squitter_core::decode::DF;

        if let Some(msg) = &msg.message {
            match &msg.df {
                DF::ShortAirAirSurveillance { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("0");
                    }
                }
                DF::SurveillanceAltitudeReply { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("4");
                    }
                }
                DF::SurveillanceIdentityReply { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("5");
                    }
                }
                DF::AllCallReply { icao, .. } => {
                    if self.aircraft_in(icao) {
                        return self.df_in("11");
                    }
                }
                DF::LongAirAirSurveillance { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("16");
                    }
                }
                DF::ExtendedSquitterADSB(adsb) => {
                    if self.aircraft_in(&adsb.icao24) {
                        return self.df_in("17");
                    }
                }
                DF::ExtendedSquitterTisB { pi, .. } => {
                    if self.aircraft_in(pi) {
                        return self.df_in("18");
                    }
                }
                DF::ExtendedSquitterMilitary { .. } => {
                    return self.df_in("19");
                }
                DF::CommBAltitudeReply { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("20");
                    }
                }
                DF::CommBIdentityReply { ap, .. } => {
                    if self.aircraft_in(ap) {
                        return self.df_in("21");
                    }
                }
                DF::CommDExtended { parity, .. } => {
                    if self.aircraft_in(parity) {
                        return self.df_in("24");
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use squitter_core::decode::Message;

    #[test]
    fn test_filter() {
        let mut tmsg = TimedMessage {
            timestamp: 0.,
            frame: hex::decode("8c4841753a9a153237aef0f275be").unwrap(),
            message: None,
            metadata: vec![],
            decode_time: None,
        };
        tmsg.message = Message::try_from(tmsg.frame.as_slice()).ok();

        let toml_data = r#"
        df_filter = []
        aircraft_filter = []
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(filter.is_in(&tmsg));

        let toml_data = r#"
            df_filter = ["17", "20", "21"]
            aircraft_filter = []
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(filter.is_in(&tmsg));

        let toml_data = r#"
            df_filter = ["17", "20", "21"]
            aircraft_filter = ["484175"]
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(filter.is_in(&tmsg));

        let toml_data = r#"
            df_filter = ["11"]
            aircraft_filter = ["484175"]
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(!filter.is_in(&tmsg));

        let toml_data = r#"
            df_filter = ["17", "20", "21"]
            aircraft_filter = ["333333"]
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(!filter.is_in(&tmsg));

        let mut tmsg = TimedMessage {
            timestamp: 1735943148.353877,
            frame: hex::decode("02c18c3b323e4f").unwrap(),
            message: None,
            metadata: vec![],
            decode_time: None,
        };
        tmsg.message = Message::try_from(tmsg.frame.as_slice()).ok();

        let toml_data = r#"
            df_filter = ["17", "20", "21"]
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(!filter.is_in(&tmsg));

        let toml_data = r#"
            df_filter = ["0"]
        "#;
        let filter: IcaoFilter =
            toml::from_str(toml_data).expect("Failed to deserialize TOML");
        assert!(filter.is_in(&tmsg));
    }
}
